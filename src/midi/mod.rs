//! MIDI song model for ticksheet
//!
//! This module turns standard MIDI files into a queryable tick index:
//! - [`NoteEvent`] values describing single note transitions
//! - [`TickIndexBuilder`] merging per-track channel streams into a [`Midi`]
//! - SMF decoding via midly in [`parser`]
//!
mod index;
mod note;
pub mod parser;

pub use index::{CollisionPolicy, Midi, RawMessage, TickIndexBuilder, Track, NOTE_OFF, NOTE_ON};
pub use note::{key_from_printable, NoteEvent, NoteKind, PitchClass, NOTE_NAMES};
pub use parser::{parse_bytes, parse_file};
