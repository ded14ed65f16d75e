//! Standard MIDI file fixtures written byte by byte
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Builds a format 1 SMF from tracks of `(absolute tick, event bytes)`
pub struct SmfWriter {
    division: u16,
    tracks: Vec<Vec<(u64, Vec<u8>)>>,
}

impl SmfWriter {
    /// `ppq` ticks per quarter note
    pub fn metrical(ppq: u16) -> Self {
        Self::with_division(ppq)
    }

    /// Raw header division word, e.g. `0xE728` for 25 fps and 40 subframes
    pub fn with_division(division: u16) -> Self {
        Self {
            division,
            tracks: Vec::new(),
        }
    }

    pub fn track(mut self, mut events: Vec<(u64, Vec<u8>)>) -> Self {
        events.sort_by_key(|(tick, _)| *tick);
        self.tracks.push(events);
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"MThd");
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.division.to_be_bytes());

        for events in &self.tracks {
            let mut data = Vec::new();
            let mut last_tick = 0u64;
            for (tick, bytes) in events {
                write_vlq(&mut data, (tick - last_tick) as u32);
                data.extend_from_slice(bytes);
                last_tick = *tick;
            }
            // end of track
            data.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

            out.extend_from_slice(b"MTrk");
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            out.extend_from_slice(&data);
        }
        out
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.bytes()).expect("write fixture");
        path
    }
}

pub fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut buf = [0u8; 4];
    let mut i = 3;
    buf[i] = (value & 0x7F) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        buf[i] = ((value & 0x7F) as u8) | 0x80;
        value >>= 7;
    }
    out.extend_from_slice(&buf[i..]);
}

pub fn note_on(channel: u8, key: u8, velocity: u8) -> Vec<u8> {
    vec![0x90 | channel, key, velocity]
}

pub fn note_off(channel: u8, key: u8) -> Vec<u8> {
    vec![0x80 | channel, key, 0]
}

pub fn program_change(channel: u8, program: u8) -> Vec<u8> {
    vec![0xC0 | channel, program]
}

pub fn tempo(us_per_quarter: u32) -> Vec<u8> {
    vec![
        0xFF,
        0x51,
        0x03,
        (us_per_quarter >> 16) as u8,
        (us_per_quarter >> 8) as u8,
        us_per_quarter as u8,
    ]
}

/// Two tracks: key 60 on channel 0 from tick 0 to 10, key 62 on channel 1
/// at tick 5. At 500 ppq and 120 BPM one tick is exactly 1 ms.
pub fn two_track_song() -> SmfWriter {
    SmfWriter::metrical(500)
        .track(vec![
            (0, tempo(500_000)),
            (0, note_on(0, 60, 100)),
            (10, note_off(0, 60)),
        ])
        .track(vec![(5, note_on(1, 62, 90))])
}

pub fn instruments() -> Vec<String> {
    vec!["Piano".to_string(), "Strings".to_string()]
}
