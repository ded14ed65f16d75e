use super::{InstrumentTable, Result, SoundBackend};
use crate::error::BackendError;
use log::debug;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Open,
    Close,
    NoteOn {
        channel: u8,
        pitch: String,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        pitch: String,
        velocity: u8,
    },
}

/// In-memory backend that records every call with its timestamp
#[derive(Debug, Default)]
pub struct RecordingBackend {
    instruments: Vec<String>,
    calls: Vec<(Instant, BackendCall)>,
    open: bool,
    fail_pitch: Option<String>,
    fail_open: bool,
}

impl RecordingBackend {
    pub fn new(instruments: Vec<String>) -> Self {
        Self {
            instruments,
            ..Self::default()
        }
    }

    /// Every note call for `pitch` fails with a send error
    pub fn failing_on(mut self, pitch: impl Into<String>) -> Self {
        self.fail_pitch = Some(pitch.into());
        self
    }

    /// `open` reports the backend as unavailable
    pub fn unavailable(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn timed_calls(&self) -> &[(Instant, BackendCall)] {
        &self.calls
    }

    pub fn note_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|(_, c)| matches!(c, BackendCall::NoteOn { .. } | BackendCall::NoteOff { .. }))
            .count()
    }

    fn record_note(&mut self, call: BackendCall, pitch: &str) -> Result<()> {
        if !self.open {
            return Err(BackendError::NotOpen);
        }
        if self.fail_pitch.as_deref() == Some(pitch) {
            return Err(BackendError::Send(format!("injected failure for {}", pitch)));
        }
        debug!("Recorded {:?}", call);
        self.calls.push((Instant::now(), call));
        Ok(())
    }
}

impl InstrumentTable for RecordingBackend {
    fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    fn instrument_name(&self, index: usize) -> Option<&str> {
        self.instruments.get(index).map(String::as_str)
    }
}

impl SoundBackend for RecordingBackend {
    fn open(&mut self) -> Result<()> {
        if self.fail_open {
            return Err(BackendError::Unavailable("recording backend disabled".into()));
        }
        self.open = true;
        self.calls.push((Instant::now(), BackendCall::Open));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        self.calls.push((Instant::now(), BackendCall::Close));
        Ok(())
    }

    fn note_on(&mut self, channel: u8, pitch: &str, velocity: u8) -> Result<()> {
        let call = BackendCall::NoteOn {
            channel,
            pitch: pitch.to_string(),
            velocity,
        };
        self.record_note(call, pitch)
    }

    fn note_off(&mut self, channel: u8, pitch: &str, velocity: u8) -> Result<()> {
        let call = BackendCall::NoteOff {
            channel,
            pitch: pitch.to_string(),
            velocity,
        };
        self.record_note(call, pitch)
    }
}
