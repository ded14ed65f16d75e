use super::{GeneralMidi, InstrumentTable, Result, SoundBackend};
use crate::error::BackendError;
use crate::midi::key_from_printable;
use log::{debug, error, info};
use midir::{MidiOutput, MidiOutputConnection};

const CLIENT_NAME: &str = "ticksheet-output";
const ALL_NOTES_OFF: u8 = 123;

/// Plays notes on an external synthesizer through a MIDI output port
pub struct MidiOutputBackend {
    device_name: Option<String>,
    connection: Option<MidiOutputConnection>,
    instruments: GeneralMidi,
}

impl MidiOutputBackend {
    /// `device_name` is matched as a substring of the port name; `None`
    /// picks the first available port when opened.
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            connection: None,
            instruments: GeneralMidi,
        }
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    fn connect(&self) -> Result<MidiOutputConnection> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let out_ports = midi_out.ports();
        let available_ports: Vec<String> = out_ports
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect();
        info!("Available MIDI output ports: {:?}", available_ports);

        let port = match &self.device_name {
            Some(name) => out_ports
                .iter()
                .find(|p| {
                    midi_out
                        .port_name(p)
                        .unwrap_or_default()
                        .contains(name.as_str())
                })
                .ok_or_else(|| {
                    error!("MIDI output device '{}' not found", name);
                    BackendError::Unavailable(format!("MIDI output device '{}' not found", name))
                })?,
            None => out_ports
                .first()
                .ok_or_else(|| BackendError::Unavailable("No MIDI output ports available".into()))?,
        };

        let port_name = midi_out
            .port_name(port)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        info!("Connecting to MIDI output port: {}", port_name);

        midi_out
            .connect(port, "ticksheet-output-conn")
            .map_err(|e| BackendError::Unavailable(e.to_string()))
    }

    fn send(&mut self, message: &[u8]) -> Result<()> {
        let conn = self.connection.as_mut().ok_or(BackendError::NotOpen)?;
        conn.send(message)
            .map_err(|e| BackendError::Send(e.to_string()))
    }

    fn send_note(&mut self, status: u8, channel: u8, pitch: &str, velocity: u8) -> Result<()> {
        let key =
            key_from_printable(pitch).ok_or_else(|| BackendError::InvalidPitch(pitch.to_string()))?;
        debug!(
            "Sending MIDI {:#04X}: ch={}, note={} ({}), vel={}",
            status, channel, key, pitch, velocity
        );
        self.send(&[status | (channel & 0x0F), key, velocity & 0x7F])
    }
}

impl InstrumentTable for MidiOutputBackend {
    fn instrument_count(&self) -> usize {
        self.instruments.instrument_count()
    }

    fn instrument_name(&self, index: usize) -> Option<&str> {
        self.instruments.instrument_name(index)
    }
}

impl SoundBackend for MidiOutputBackend {
    fn open(&mut self) -> Result<()> {
        if self.connection.is_none() {
            self.connection = Some(self.connect()?);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.connection.is_none() {
            return Ok(());
        }
        for channel in 0..16u8 {
            if let Err(e) = self.send(&[0xB0 | channel, ALL_NOTES_OFF, 0]) {
                error!("Failed to silence channel {}: {}", channel, e);
            }
        }
        if let Some(conn) = self.connection.take() {
            conn.close();
            info!("MIDI output connection closed");
        }
        Ok(())
    }

    fn note_on(&mut self, channel: u8, pitch: &str, velocity: u8) -> Result<()> {
        self.send_note(0x90, channel, pitch, velocity)
    }

    fn note_off(&mut self, channel: u8, pitch: &str, velocity: u8) -> Result<()> {
        self.send_note(0x80, channel, pitch, velocity)
    }
}

impl Drop for MidiOutputBackend {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(not(feature = "test-mock"))]
pub fn list_devices() -> Vec<String> {
    match MidiOutput::new("ticksheet-port-lister") {
        Ok(midi_out) => midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect(),
        Err(e) => {
            error!("Failed to list MIDI ports: {}", e);
            vec![]
        }
    }
}

#[cfg(feature = "test-mock")]
pub fn list_devices() -> Vec<String> {
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
