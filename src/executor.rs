use std::io;
use std::thread::{self, JoinHandle};

/// Where long-running playback work is run
pub trait Executor {
    fn spawn<F, T>(&self, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}

/// One named OS thread per job. The clock spins, so it gets its own core.
pub struct DedicatedThread {
    name: String,
}

impl DedicatedThread {
    pub fn new() -> Self {
        Self::named("tick-clock")
    }

    pub fn named(name: impl Into<String>) -> Self {
        DedicatedThread { name: name.into() }
    }
}

impl Default for DedicatedThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for DedicatedThread {
    fn spawn<F, T>(&self, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        thread::Builder::new().name(self.name.clone()).spawn(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_thread_spawn() {
        let executor = DedicatedThread::new();
        let handle = executor
            .spawn(|| thread::current().name().map(str::to_string))
            .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("tick-clock"));
    }

    #[test]
    fn test_result_comes_back() {
        let executor = DedicatedThread::named("worker");
        let handle = executor.spawn(|| 6 * 7).unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }
}
