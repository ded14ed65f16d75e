//! Error types shared across the crate

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a MIDI file into a tick index.
///
/// At the host boundary this always means "no song loaded".
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unable to read MIDI file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed MIDI data: {0}")]
    Decode(String),
    #[error("sequence has a zero tick length, tick duration is undefined")]
    ZeroTickLength,
}

/// Errors reported by a sound backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("sound backend unavailable: {0}")]
    Unavailable(String),
    #[error("sound backend is not open")]
    NotOpen,
    #[error("invalid pitch '{0}'")]
    InvalidPitch(String),
    #[error("failed to send MIDI message: {0}")]
    Send(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The backend could not be opened or closed. Fatal to the current run.
    #[error("playback aborted: {0}")]
    BackendUnavailable(#[source] BackendError),
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("unable to read song directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no .mid files found in {0}")]
    Empty(PathBuf),
}
