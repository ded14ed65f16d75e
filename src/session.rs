//! Operation-style surface for an orchestrating host
//!
//! A [`Session`] loads one song at a time and exposes it through simple
//! calls returning plain values and sentinels, never errors. Two fields are
//! published through [`SessionState`] for the host to watch: the current
//! song name and whether ticks remain.

use crate::backend::InstrumentTable;
use crate::clock::{SpinWait, WaitStrategy};
use crate::library;
use crate::midi::{parse_file, CollisionPolicy, NoteEvent};
use crate::state::{SessionState, SharedSessionState};
use crate::stream::TickStream;
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

/// Returned by [`Session::random_available_song`] when nothing can be picked
pub const INVALID_SONG: &str = "invalid";

/// One batch of notes flattened into parallel columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickBatch {
    pub count: usize,
    pub kinds: Vec<String>,
    pub instruments: Vec<String>,
    pub pitches: Vec<String>,
    pub velocities: Vec<u8>,
}

impl From<&[NoteEvent]> for TickBatch {
    fn from(events: &[NoteEvent]) -> Self {
        Self {
            count: events.len(),
            kinds: events.iter().map(|n| n.kind().to_string()).collect(),
            instruments: events.iter().map(|n| n.instrument().to_string()).collect(),
            pitches: events.iter().map(NoteEvent::printable).collect(),
            velocities: events.iter().map(NoteEvent::velocity).collect(),
        }
    }
}

pub struct Session<T: InstrumentTable> {
    instruments: T,
    policy: CollisionPolicy,
    stream: TickStream,
    state: SharedSessionState,
    needed_cursor: usize,
}

impl<T: InstrumentTable> Session<T> {
    pub fn new(instruments: T) -> Self {
        Self::with_options(instruments, CollisionPolicy::default(), Arc::new(SpinWait))
    }

    pub fn with_options(
        instruments: T,
        policy: CollisionPolicy,
        strategy: Arc<dyn WaitStrategy>,
    ) -> Self {
        Self {
            instruments,
            policy,
            stream: TickStream::with_strategy(strategy),
            state: SessionState::shared(),
            needed_cursor: 0,
        }
    }

    /// Handle to the observable fields
    pub fn state(&self) -> SharedSessionState {
        Arc::clone(&self.state)
    }

    pub fn stream(&self) -> &TickStream {
        &self.stream
    }

    /// Loads and indexes a song. On failure no song is loaded afterwards.
    pub fn load_song(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match parse_file(path, &self.instruments, self.policy) {
            Ok(midi) => {
                let midi = Arc::new(midi);
                self.stream.reset(Arc::clone(&midi), &self.instruments);
                self.state.set_song_name(midi.name());
                self.state.set_has_ticks(self.stream.has_more());
                self.needed_cursor = 0;
                info!(
                    "Session loaded '{}' needing {} instruments",
                    midi.name(),
                    self.stream.instruments().len()
                );
                true
            }
            Err(e) => {
                error!("Failed to load song {}: {}", path.display(), e);
                self.stream.clear();
                self.state.clear();
                self.needed_cursor = 0;
                false
            }
        }
    }

    /// Name (without extension) of a random song in `dir`, or `"invalid"`
    pub fn random_available_song(&self, dir: impl AsRef<Path>) -> String {
        match library::random_song(dir.as_ref(), &mut rand::thread_rng()) {
            Ok(name) => name,
            Err(e) => {
                warn!("No song available: {}", e);
                INVALID_SONG.to_string()
            }
        }
    }

    /// Next instrument the loaded song uses, in first-seen order
    ///
    /// Returns `("", false)` once every instrument has been handed out.
    pub fn next_needed_instrument(&mut self) -> (String, bool) {
        match self.stream.instruments().nth(self.needed_cursor) {
            Some(slot) => {
                self.needed_cursor += 1;
                (slot.name.clone(), true)
            }
            None => (String::new(), false),
        }
    }

    /// Next non-empty batch, paced like real playback
    pub fn advance_tick(&mut self) -> TickBatch {
        if self.stream.midi().is_none() {
            return TickBatch::default();
        }
        let advance = self.stream.advance();
        self.state.set_has_ticks(advance.has_more);
        TickBatch::from(advance.events.as_slice())
    }

    pub fn set_tick_ceiling(&mut self, tick: u64) {
        self.stream.set_max_tick(tick);
        if self.stream.midi().is_some() {
            self.state.set_has_ticks(self.stream.has_more());
        }
    }

    pub fn wait_remainder_of_tick(&mut self) {
        self.stream.wait_only();
    }
}
