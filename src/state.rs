use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Fields the host watches while a song is streamed
pub struct SessionState {
    song_name: RwLock<String>,
    pub has_ticks: AtomicBool,
}

pub type SharedSessionState = Arc<SessionState>;

impl Default for SessionState {
    fn default() -> Self {
        Self {
            song_name: RwLock::new(String::new()),
            has_ticks: AtomicBool::new(false),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSessionState {
        Arc::new(Self::new())
    }

    pub fn song_name(&self) -> String {
        match self.song_name.read() {
            Ok(name) => name.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_song_name(&self, name: &str) {
        let mut guard = match self.song_name.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clear();
        guard.push_str(name);
    }

    pub fn has_ticks(&self) -> bool {
        self.has_ticks.load(Ordering::SeqCst)
    }

    pub fn set_has_ticks(&self, has_ticks: bool) {
        self.has_ticks.store(has_ticks, Ordering::SeqCst);
    }

    /// Back to "no song loaded"
    pub fn clear(&self) {
        self.set_song_name("");
        self.set_has_ticks(false);
    }
}
