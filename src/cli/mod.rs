use crate::library;
use clap::{Parser, Subcommand};
use dialoguer::Select;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI output devices
    #[arg(long)]
    pub device_list: bool,

    /// Settings file, instead of ./ticksheet.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Send notes to a specific MIDI output device
    #[arg(long, value_name = "DEVICE")]
    pub output_device: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play a song in real time
    Play {
        /// Song file; omit together with --random or --pick
        file: Option<PathBuf>,

        /// Play a random song from the songs directory
        #[arg(long, conflicts_with_all = ["file", "pick"])]
        random: bool,

        /// Choose a song from the songs directory interactively
        #[arg(long, conflicts_with = "file")]
        pick: bool,

        /// Record notes in memory instead of opening a MIDI port
        #[arg(long)]
        dry_run: bool,
    },
    /// Print each batch of notes as it comes due
    Stream {
        file: PathBuf,

        /// Stop before this tick
        #[arg(long, value_name = "TICK")]
        max_tick: Option<u64>,
    },
    /// List the instruments a song needs, in order of first use
    Instruments { file: PathBuf },
    /// Print the name of a random song from the songs directory
    Random,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}

/// Which song `play` should load
pub fn resolve_play_target(
    file: Option<&Path>,
    random: bool,
    pick: bool,
    songs_dir: &Path,
) -> Result<PathBuf, String> {
    if let Some(file) = file {
        return Ok(file.to_path_buf());
    }
    if random {
        let name = library::random_song(songs_dir, &mut rand::thread_rng())
            .map_err(|e| format!("Error: {}", e))?;
        return Ok(library::song_path(songs_dir, &name));
    }
    if pick {
        let songs = library::list_songs(songs_dir).map_err(|e| format!("Error: {}", e))?;
        return pick_song(&songs)?.ok_or_else(|| "No song selected".to_string());
    }
    Err("Error: give a song file, --random or --pick".to_string())
}

/// Interactive song menu. `None` if the user backs out.
pub fn pick_song(songs: &[PathBuf]) -> Result<Option<PathBuf>, String> {
    if songs.is_empty() {
        return Err("Error: no songs to choose from".to_string());
    }
    let names: Vec<String> = songs.iter().map(|p| library::song_name(p)).collect();
    let choice = Select::new()
        .with_prompt("Song")
        .items(&names)
        .default(0)
        .interact_opt()
        .map_err(|e| format!("Error: {}", e))?;
    Ok(choice.map(|i| songs[i].clone()))
}
