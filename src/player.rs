//! Owned real-time playback of a tick index through a sound backend

use crate::backend::SoundBackend;
use crate::clock::{Clock, SpinWait, WaitStrategy};
use crate::error::{BackendError, PlaybackError};
use crate::midi::Midi;
use log::{error, info, trace};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

/// Receives playback progress in whole percent
pub trait ProgressObserver {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressObserver for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Discards progress reports
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&mut self, _percent: u8) {}
}

/// `floor(tick / max_tick * 100)`, 100 for an empty song
pub fn progress_percent(tick: u64, max_tick: u64) -> u8 {
    if max_tick == 0 {
        return 100;
    }
    let percent = u128::from(tick.min(max_tick)) * 100 / u128::from(max_tick);
    percent as u8
}

/// Shared stop flag, checked once per tick
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

/// A note the backend refused. Playback carried on without it.
#[derive(Debug)]
pub struct NoteFailure {
    pub tick: u64,
    pub pitch: String,
    pub error: BackendError,
}

#[derive(Debug)]
pub struct PlaybackReport {
    pub outcome: PlaybackOutcome,
    /// Ticks dispatched, including the last one
    pub ticks: u64,
    pub notes_sent: usize,
    pub failures: Vec<NoteFailure>,
    pub elapsed: Duration,
}

/// Plays a [`Midi`] tick by tick, pacing with a [`Clock`]
pub struct Player<B: SoundBackend> {
    backend: B,
    strategy: Arc<dyn WaitStrategy>,
    state: PlayerState,
}

impl<B: SoundBackend> Player<B> {
    pub fn new(backend: B) -> Self {
        Self::with_strategy(backend, Arc::new(SpinWait))
    }

    pub fn with_strategy(backend: B, strategy: Arc<dyn WaitStrategy>) -> Self {
        Self {
            backend,
            strategy,
            state: PlayerState::Idle,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Plays every tick from 0 through `max_tick`
    ///
    /// Only opening or closing the backend can fail the run; individual
    /// note failures end up in [`PlaybackReport::failures`].
    pub fn play(
        &mut self,
        midi: &Midi,
        progress: &mut dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> Result<PlaybackReport, PlaybackError> {
        self.backend
            .open()
            .map_err(PlaybackError::BackendUnavailable)?;

        let max_tick = midi.max_tick();
        info!(
            "Playing '{}': {} ticks at {:.1} us/tick",
            midi.name(),
            max_tick,
            midi.tick_duration_micros()
        );

        self.state = PlayerState::Running;
        let started = Instant::now();
        let mut clock = Clock::with_strategy(midi.tick_duration(), self.strategy.clone());
        let mut report = PlaybackReport {
            outcome: PlaybackOutcome::Completed,
            ticks: 0,
            notes_sent: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        };

        clock.start();
        let mut tick = 0u64;
        loop {
            if cancel.is_cancelled() {
                info!("Playback of '{}' cancelled at tick {}", midi.name(), tick);
                report.outcome = PlaybackOutcome::Cancelled;
                break;
            }

            progress.report(progress_percent(tick, max_tick));
            self.dispatch(midi, tick, &mut report);
            report.ticks += 1;

            if tick >= max_tick {
                self.state = PlayerState::Finished;
                break;
            }

            trace!("Tick {} took {:?}", tick, clock.elapsed());
            clock.wait_for_next_tick();
            tick += 1;
        }

        report.elapsed = started.elapsed();
        let closed = self.backend.close();
        self.state = PlayerState::Idle;
        closed.map_err(PlaybackError::BackendUnavailable)?;

        if report.outcome == PlaybackOutcome::Completed {
            progress.report(100);
            info!(
                "Finished '{}' in {:?}: {} notes, {} failures",
                midi.name(),
                report.elapsed,
                report.notes_sent,
                report.failures.len()
            );
        }
        Ok(report)
    }

    fn dispatch(&mut self, midi: &Midi, tick: u64, report: &mut PlaybackReport) {
        for note in midi.notes_at(tick) {
            match note.apply(&mut self.backend) {
                Ok(()) => report.notes_sent += 1,
                Err(e) => {
                    error!("Tick {}: failed to play {}: {}", tick, note, e);
                    report.failures.push(NoteFailure {
                        tick,
                        pitch: note.printable(),
                        error: e,
                    });
                }
            }
        }
    }
}
