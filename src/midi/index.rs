//! Per-tick note index built from raw per-track channel streams

use super::note::{NoteEvent, NoteKind};
use crate::backend::InstrumentTable;
use crate::clock::compute_tick_duration;
use crate::error::ParseError;
use log::{debug, trace};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;

/// A channel voice message as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl RawMessage {
    pub fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Parses a 2 or 3 byte channel message. System messages yield `None`.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [status, data1, rest @ ..] if (0x80..0xF0).contains(status) => Some(Self {
                status: *status,
                data1: *data1,
                data2: rest.first().copied().unwrap_or(0),
            }),
            _ => None,
        }
    }

    pub fn command(&self) -> u8 {
        self.status & 0xF0
    }

    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }
}

/// What happens when two notes land on the same tick of one track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Every simultaneous note is kept, in arrival order
    #[default]
    KeepAll,
    /// Only the last note written to a tick survives
    LastWriteWins,
}

#[derive(Debug, Clone)]
pub struct Track {
    index: usize,
    events: BTreeMap<u64, Vec<NoteEvent>>,
}

impl Track {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            events: BTreeMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn insert(&mut self, tick: u64, note: NoteEvent, policy: CollisionPolicy) {
        let slot = self.events.entry(tick).or_default();
        if policy == CollisionPolicy::LastWriteWins {
            slot.clear();
        }
        slot.push(note);
    }

    pub fn notes_at(&self, tick: u64) -> &[NoteEvent] {
        self.events.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest populated tick
    pub fn last_tick(&self) -> Option<u64> {
        self.events.keys().next_back().copied()
    }

    pub fn ticks(&self) -> impl Iterator<Item = u64> + '_ {
        self.events.keys().copied()
    }

    pub fn note_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

/// The normalized tick index of one song. Read-only once built.
#[derive(Debug, Clone)]
pub struct Midi {
    name: String,
    tick_duration: Duration,
    max_tick: u64,
    tracks: Vec<Track>,
}

impl Midi {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn tick_duration_micros(&self) -> f64 {
        self.tick_duration.as_secs_f64() * 1_000_000.0
    }

    pub fn max_tick(&self) -> u64 {
        self.max_tick
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Notes at exactly `tick`, ascending track order
    pub fn notes_at(&self, tick: u64) -> impl Iterator<Item = &NoteEvent> + '_ {
        self.tracks
            .iter()
            .flat_map(move |track| track.notes_at(tick).iter())
    }

    pub fn notes(&self, tick: u64) -> Vec<&NoteEvent> {
        self.notes_at(tick).collect()
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(Track::note_count).sum()
    }

    fn normalize(&mut self) {
        self.tracks.sort_by_key(Track::index);
        self.max_tick = self
            .tracks
            .iter()
            .filter_map(Track::last_tick)
            .max()
            .unwrap_or(0);
    }
}

/// Collects per-track channel streams into a [`Midi`]
pub struct TickIndexBuilder<'a> {
    name: String,
    instruments: &'a dyn InstrumentTable,
    policy: CollisionPolicy,
    tracks: Vec<Track>,
}

impl<'a> TickIndexBuilder<'a> {
    pub fn new(name: impl Into<String>, instruments: &'a dyn InstrumentTable) -> Self {
        Self {
            name: name.into(),
            instruments,
            policy: CollisionPolicy::default(),
            tracks: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds one track. Anything other than note on/off is skipped.
    pub fn add_track<I>(&mut self, index: usize, events: I) -> &mut Self
    where
        I: IntoIterator<Item = (u64, RawMessage)>,
    {
        let mut track = Track::new(index);
        for (tick, message) in events {
            if let Some(note) = self.note_from(message) {
                trace!("track {} tick {}: {}", index, tick, note);
                track.insert(tick, note, self.policy);
            }
        }
        self.tracks.push(track);
        self
    }

    fn note_from(&self, message: RawMessage) -> Option<NoteEvent> {
        let kind = match message.command() {
            NOTE_ON if message.data2 > 0 => NoteKind::On,
            // note on with velocity 0 is a release
            NOTE_ON | NOTE_OFF => NoteKind::Off,
            _ => return None,
        };
        let channel = message.channel();
        let instrument = self
            .instruments
            .instrument_name(usize::from(channel))
            .unwrap_or_default()
            .trim();
        Some(NoteEvent::new(
            kind,
            message.data1,
            message.data2,
            channel,
            instrument,
        ))
    }

    /// Finishes the index using the sequence's declared total length
    pub fn finish(self, micros_len: u64, tick_len: u64) -> Result<Midi, ParseError> {
        let tick_duration = compute_tick_duration(micros_len, tick_len)?;
        let mut midi = Midi {
            name: self.name,
            tick_duration,
            max_tick: 0,
            tracks: self.tracks,
        };
        midi.normalize();

        if midi.max_tick > 0 && tick_duration.is_zero() {
            return Err(ParseError::Decode(format!(
                "{} us over {} ticks rounds to a zero tick duration",
                micros_len, tick_len
            )));
        }

        debug!(
            "Indexed '{}': {} tracks, {} notes, max tick {}, {:.3} us/tick",
            midi.name,
            midi.tracks.len(),
            midi.note_count(),
            midi.max_tick,
            midi.tick_duration_micros()
        );
        Ok(midi)
    }
}
