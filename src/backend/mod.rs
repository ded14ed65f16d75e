//! Sound backends
//!
//! The tick index and schedulers only talk to a backend through these traits:
//! - [`InstrumentTable`] resolves instrument names and indices
//! - [`SoundBackend`] starts and stops notes
//!
//! Concrete implementations:
//! - [`MidiOutputBackend`] sends note messages to a MIDI output port via midir
//! - [`RecordingBackend`] keeps every call in memory
//!
mod general_midi;
pub mod midi_output;
pub mod recording;

use crate::error::BackendError;

pub use general_midi::{GeneralMidi, GENERAL_MIDI_PROGRAMS};
pub use midi_output::{list_devices, MidiOutputBackend};
pub use recording::{BackendCall, RecordingBackend};

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Ordered list of instrument names known to a backend
pub trait InstrumentTable {
    fn instrument_count(&self) -> usize;

    /// Name at `index`, `None` if out of range
    fn instrument_name(&self, index: usize) -> Option<&str>;

    fn list_instruments(&self) -> Vec<String> {
        (0..self.instrument_count())
            .filter_map(|i| self.instrument_name(i).map(|n| n.trim().to_string()))
            .collect()
    }

    /// Index of `name`, 0 when absent
    fn resolve_instrument(&self, name: &str) -> usize {
        (0..self.instrument_count())
            .find(|&i| self.instrument_name(i).map(str::trim) == Some(name))
            .unwrap_or(0)
    }
}

impl InstrumentTable for Vec<String> {
    fn instrument_count(&self) -> usize {
        self.len()
    }

    fn instrument_name(&self, index: usize) -> Option<&str> {
        self.get(index).map(String::as_str)
    }
}

/// Something that can make notes sound
///
/// `note_off` for a note that was never started must succeed.
pub trait SoundBackend: InstrumentTable + Send {
    fn open(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn note_on(&mut self, channel: u8, pitch: &str, velocity: u8) -> Result<()>;

    fn note_off(&mut self, channel: u8, pitch: &str, velocity: u8) -> Result<()>;
}
