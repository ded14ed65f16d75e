//! Discovery of `.mid` files in a song directory

use crate::error::LibraryError;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

pub const SONG_EXTENSION: &str = "mid";

/// All `.mid` files directly inside `dir`, sorted by path
pub fn list_songs(dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let io_err = |source: std::io::Error| LibraryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut songs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SONG_EXTENSION) {
            songs.push(path);
        }
    }
    songs.sort();
    debug!("Found {} songs in {}", songs.len(), dir.display());
    Ok(songs)
}

/// File name without its extension
pub fn song_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of the song called `name` inside `dir`
pub fn song_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, SONG_EXTENSION))
}

pub fn random_song<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Result<String, LibraryError> {
    let songs = list_songs(dir)?;
    songs
        .choose(rng)
        .map(|p| song_name(p))
        .ok_or_else(|| LibraryError::Empty(dir.to_path_buf()))
}
