//! Terminal output for playback
//!
//! The player runs on its own thread, so progress is forwarded over a
//! channel with [`ChannelProgress`] and drawn on the main thread by
//! [`render_progress`] into an indicatif bar.

mod progress;

pub use progress::{create_song_progress, render_progress, ChannelProgress, ConsoleProgress};
