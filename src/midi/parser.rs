//! Standard MIDI file decoding
//!
//! Decodes an SMF with midly, turns every track into an absolute-tick stream
//! of raw channel messages and hands the streams to [`TickIndexBuilder`].

use super::index::{CollisionPolicy, Midi, RawMessage, TickIndexBuilder};
use crate::backend::InstrumentTable;
use crate::error::ParseError;
use log::{debug, info};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::fs;
use std::path::Path;

/// Tempo assumed until the first Set Tempo event (120 BPM)
pub const DEFAULT_TEMPO_US_PER_QUARTER: u64 = 500_000;

pub fn parse_file(
    path: &Path,
    instruments: &dyn InstrumentTable,
    policy: CollisionPolicy,
) -> Result<Midi, ParseError> {
    let bytes = fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let midi = parse_bytes(&name, &bytes, instruments, policy)?;
    info!(
        "Loaded '{}' from {} ({} ticks)",
        midi.name(),
        path.display(),
        midi.max_tick()
    );
    Ok(midi)
}

pub fn parse_bytes(
    name: &str,
    bytes: &[u8],
    instruments: &dyn InstrumentTable,
    policy: CollisionPolicy,
) -> Result<Midi, ParseError> {
    let smf = Smf::parse(bytes).map_err(|e| ParseError::Decode(e.to_string()))?;

    let mut builder = TickIndexBuilder::new(name, instruments).with_policy(policy);
    let mut tempo_map: Vec<(u64, u64)> = Vec::new();
    let mut tick_len = 0u64;

    for (i, track) in smf.tracks.iter().enumerate() {
        let mut tick = 0u64;
        let mut stream = Vec::new();

        for event in track {
            tick += u64::from(event.delta.as_int());
            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    stream.push((tick, raw_message(channel.as_int(), message)));
                }
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    tempo_map.push((tick, u64::from(tempo.as_int())));
                }
                _ => {}
            }
            tick_len = tick_len.max(tick);
        }

        builder.add_track(i + 1, stream);
    }

    let micros_len = match smf.header.timing {
        Timing::Metrical(ppq) => metrical_length(&mut tempo_map, u64::from(ppq.as_int()), tick_len)?,
        Timing::Timecode(fps, subframes) => {
            timecode_length(f64::from(fps.as_f32()), subframes, tick_len)?
        }
    };
    debug!(
        "'{}': {:?} timing, {} tempo changes, {} us over {} ticks",
        name,
        smf.header.timing,
        tempo_map.len(),
        micros_len,
        tick_len
    );

    builder.finish(micros_len, tick_len)
}

fn raw_message(channel: u8, message: MidiMessage) -> RawMessage {
    let channel = channel & 0x0F;
    match message {
        MidiMessage::NoteOff { key, vel } => RawMessage::new(0x80 | channel, key.as_int(), vel.as_int()),
        MidiMessage::NoteOn { key, vel } => RawMessage::new(0x90 | channel, key.as_int(), vel.as_int()),
        MidiMessage::Aftertouch { key, vel } => {
            RawMessage::new(0xA0 | channel, key.as_int(), vel.as_int())
        }
        MidiMessage::Controller { controller, value } => {
            RawMessage::new(0xB0 | channel, controller.as_int(), value.as_int())
        }
        MidiMessage::ProgramChange { program } => {
            RawMessage::new(0xC0 | channel, program.as_int(), 0)
        }
        MidiMessage::ChannelAftertouch { vel } => RawMessage::new(0xD0 | channel, vel.as_int(), 0),
        MidiMessage::PitchBend { bend } => {
            let raw = bend.0.as_int();
            RawMessage::new(0xE0 | channel, (raw & 0x7F) as u8, (raw >> 7) as u8)
        }
    }
}

/// Total microseconds of a metrical sequence, integrating the tempo map
fn metrical_length(
    tempo_map: &mut [(u64, u64)],
    ppq: u64,
    tick_len: u64,
) -> Result<u64, ParseError> {
    if ppq == 0 {
        return Err(ParseError::Decode("header declares 0 ticks per quarter".into()));
    }
    tempo_map.sort_by_key(|(tick, _)| *tick);

    // tick * us-per-quarter, divided by ppq once at the end
    let mut scaled: u128 = 0;
    let mut last_tick = 0u64;
    let mut tempo = DEFAULT_TEMPO_US_PER_QUARTER;
    for &(tick, next_tempo) in tempo_map.iter() {
        let tick = tick.min(tick_len);
        scaled += u128::from(tick - last_tick) * u128::from(tempo);
        last_tick = tick;
        tempo = next_tempo;
    }
    scaled += u128::from(tick_len - last_tick) * u128::from(tempo);

    Ok(u64::try_from(scaled / u128::from(ppq)).unwrap_or(u64::MAX))
}

fn timecode_length(fps: f64, subframes: u8, tick_len: u64) -> Result<u64, ParseError> {
    let ticks_per_second = fps * f64::from(subframes);
    if ticks_per_second <= 0.0 {
        return Err(ParseError::Decode("timecode header declares 0 subframes".into()));
    }
    Ok((tick_len as f64 * 1_000_000.0 / ticks_per_second).round() as u64)
}
