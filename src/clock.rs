// clock.rs

use crate::error::ParseError;
use log::{trace, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Duration of one tick given a sequence's total length
pub fn compute_tick_duration(micros_len: u64, tick_len: u64) -> Result<Duration, ParseError> {
    if tick_len == 0 {
        return Err(ParseError::ZeroTickLength);
    }
    let nanos = u128::from(micros_len) * 1_000 / u128::from(tick_len);
    Ok(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}

/// Blocks for whatever is left of `tick_duration` after `elapsed`
pub fn wait_remainder(tick_duration: Duration, elapsed: Duration) {
    if let Some(rest) = tick_duration.checked_sub(elapsed) {
        SpinWait.wait_until(Instant::now() + rest);
    }
}

/// How the clock burns time until a deadline
pub trait WaitStrategy: Send + Sync {
    fn wait_until(&self, deadline: Instant);
}

/// Pure busy-wait. Occupies a core, accurate to a few microseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinWait;

impl WaitStrategy for SpinWait {
    fn wait_until(&self, deadline: Instant) {
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Sleeps until `spin_window` before the deadline, then spins
#[derive(Debug, Clone, Copy)]
pub struct HybridWait {
    spin_window: Duration,
}

impl HybridWait {
    pub fn new(spin_window: Duration) -> Self {
        Self { spin_window }
    }
}

impl Default for HybridWait {
    fn default() -> Self {
        Self::new(Duration::from_millis(2))
    }
}

impl WaitStrategy for HybridWait {
    fn wait_until(&self, deadline: Instant) {
        let now = Instant::now();
        if let Some(remaining) = deadline.checked_duration_since(now) {
            if remaining > self.spin_window {
                thread::sleep(remaining - self.spin_window);
            }
        }
        SpinWait.wait_until(deadline);
    }
}

/// Tick pacing with a fixed anchor
///
/// Each wait targets `tick_start + tick_duration` and then moves the anchor
/// forward by exactly one tick, so overshoot in one tick is absorbed by the
/// next instead of accumulating.
pub struct Clock {
    tick_duration: Duration,
    tick_start: Instant,
    strategy: Arc<dyn WaitStrategy>,
}

impl Clock {
    pub fn new(tick_duration: Duration) -> Self {
        Self::with_strategy(tick_duration, Arc::new(SpinWait))
    }

    pub fn with_strategy(tick_duration: Duration, strategy: Arc<dyn WaitStrategy>) -> Self {
        Self {
            tick_duration,
            tick_start: Instant::now(),
            strategy,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn set_tick_duration(&mut self, tick_duration: Duration) {
        self.tick_duration = tick_duration;
    }

    /// Marks now as the start of the current tick
    pub fn start(&mut self) {
        self.tick_start = Instant::now();
    }

    pub fn tick_start(&self) -> Instant {
        self.tick_start
    }

    /// Time spent in the current tick so far
    pub fn elapsed(&self) -> Duration {
        self.tick_start.elapsed()
    }

    /// Waits out the rest of the current tick and starts the next one
    pub fn wait_for_next_tick(&mut self) {
        let deadline = self.tick_start + self.tick_duration;
        let now = Instant::now();

        if now < deadline {
            self.strategy.wait_until(deadline);
            self.tick_start = deadline;
            return;
        }

        let late = now - deadline;
        if late > self.tick_duration {
            warn!("Clock fell {:?} behind, resyncing tick anchor", late);
            self.tick_start = now;
        } else {
            trace!("Tick overran by {:?}", late);
            self.tick_start = deadline;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_tick_duration() {
        assert_eq!(
            compute_tick_duration(10_000, 10).unwrap(),
            Duration::from_micros(1000)
        );
        // 1 us spread over 3 ticks keeps sub-microsecond precision
        assert_eq!(
            compute_tick_duration(1, 3).unwrap(),
            Duration::from_nanos(333)
        );
        assert!(matches!(
            compute_tick_duration(10, 0),
            Err(ParseError::ZeroTickLength)
        ));
    }

    #[test]
    fn test_wait_remainder_returns_immediately_when_overdue() {
        let start = Instant::now();
        wait_remainder(Duration::from_millis(1), Duration::from_millis(5));
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[test]
    fn test_wait_remainder_waits_the_difference() {
        let start = Instant::now();
        wait_remainder(Duration::from_millis(3), Duration::from_millis(1));
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(2));
        assert!(waited < Duration::from_millis(12), "waited {:?}", waited);
    }

    #[test]
    fn test_late_clock_resyncs() {
        let mut clock = Clock::new(Duration::from_micros(100));
        clock.start();
        thread::sleep(Duration::from_millis(5));
        clock.wait_for_next_tick();
        // anchor moved to now rather than replaying missed ticks
        assert!(clock.elapsed() < Duration::from_millis(2));
    }
}
