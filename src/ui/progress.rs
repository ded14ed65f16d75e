use crate::player::ProgressObserver;
use crossbeam::channel::{Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_song_progress(song: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan}] {pos:>3}% {elapsed_precise}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("⣀⣤⣦⣶⣷⣿ ");
    pb.set_style(style);
    pb.set_prefix(song.to_string());
    pb
}

/// Draws progress straight into a bar
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new(song: &str) -> Self {
        Self {
            bar: create_song_progress(song),
        }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl ProgressObserver for ConsoleProgress {
    fn report(&mut self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }
}

/// Sends each new percent to another thread
///
/// Repeats are dropped so the channel carries at most 101 messages a song.
pub struct ChannelProgress {
    sender: Sender<u8>,
    last: Option<u8>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<u8>) -> Self {
        Self { sender, last: None }
    }
}

impl ProgressObserver for ChannelProgress {
    fn report(&mut self, percent: u8) {
        if self.last == Some(percent) {
            return;
        }
        self.last = Some(percent);
        // receiver gone means nobody is watching
        let _ = self.sender.send(percent);
    }
}

/// Feeds `progress` from `receiver` until every sender is dropped
pub fn render_progress(receiver: &Receiver<u8>, progress: &mut ConsoleProgress) {
    for percent in receiver.iter() {
        progress.report(percent);
    }
    progress.finish();
}
