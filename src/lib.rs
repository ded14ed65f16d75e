pub mod backend;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod library;
pub mod logging;
pub mod midi;
pub mod player;
pub mod session;
pub mod state;
pub mod stream;
pub mod ui;

pub use backend::{InstrumentTable, SoundBackend};
pub use cli::{validate_device, Args, Command};
pub use clock::{Clock, HybridWait, SpinWait, WaitStrategy};
pub use error::{BackendError, LibraryError, ParseError, PlaybackError};
pub use executor::{DedicatedThread, Executor};
pub use midi::{Midi, NoteEvent, NoteKind};
pub use player::{CancelToken, PlaybackOutcome, PlaybackReport, Player, ProgressObserver};
pub use session::{Session, TickBatch};
pub use state::{SessionState, SharedSessionState};
pub use stream::TickStream;

/// Names of the MIDI output ports on this machine
pub fn handle_device_list() -> Vec<String> {
    backend::list_devices()
}
