//! Externally paced tick stream
//!
//! [`TickStream`] hands non-empty batches of notes to a caller that drives its
//! own playback, while keeping the same pacing as [`crate::player::Player`].

use crate::backend::InstrumentTable;
use crate::clock::{Clock, SpinWait, WaitStrategy};
use crate::midi::{Midi, NoteEvent};
use log::{debug, info, trace};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// Notes of one instrument, keyed by tick
#[derive(Debug, Clone)]
pub struct InstrumentSlot {
    pub index: usize,
    pub name: String,
    pub notes: BTreeMap<u64, Vec<NoteEvent>>,
}

/// Per-instrument projection of a song, slots in first-seen order
#[derive(Debug, Clone, Default)]
pub struct InstrumentIndex {
    slots: Vec<InstrumentSlot>,
}

impl InstrumentIndex {
    pub fn build(midi: &Midi, instruments: &dyn InstrumentTable) -> Self {
        let mut slots: Vec<InstrumentSlot> = Vec::new();
        let ticks: BTreeSet<u64> = midi.tracks().iter().flat_map(|t| t.ticks()).collect();
        for tick in ticks {
            for note in midi.notes_at(tick) {
                let index = instruments.resolve_instrument(note.instrument());
                let pos = match slots.iter().position(|s| s.index == index) {
                    Some(pos) => pos,
                    None => {
                        slots.push(InstrumentSlot {
                            index,
                            name: note.instrument().to_string(),
                            notes: BTreeMap::new(),
                        });
                        slots.len() - 1
                    }
                };
                slots[pos]
                    .notes
                    .entry(tick)
                    .or_default()
                    .push(note.clone());
            }
        }
        debug!(
            "Instrument index for '{}': {:?}",
            midi.name(),
            slots.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at position `n` in first-seen order
    pub fn nth(&self, n: usize) -> Option<&InstrumentSlot> {
        self.slots.get(n)
    }

    pub fn slot(&self, index: usize) -> Option<&InstrumentSlot> {
        self.slots.iter().find(|s| s.index == index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentSlot> {
        self.slots.iter()
    }
}

/// Result of one [`TickStream::advance`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advance {
    pub events: Vec<NoteEvent>,
    pub has_more: bool,
}

/// Pull-based scheduler over one song at a time
pub struct TickStream {
    midi: Option<Arc<Midi>>,
    instruments: InstrumentIndex,
    clock: Clock,
    current_tick: u64,
    ceiling: u64,
    started: bool,
    pending_pace: bool,
}

impl Default for TickStream {
    fn default() -> Self {
        Self::new()
    }
}

impl TickStream {
    pub fn new() -> Self {
        Self::with_strategy(Arc::new(SpinWait))
    }

    pub fn with_strategy(strategy: Arc<dyn WaitStrategy>) -> Self {
        Self {
            midi: None,
            instruments: InstrumentIndex::default(),
            clock: Clock::with_strategy(Duration::ZERO, strategy),
            current_tick: 0,
            ceiling: u64::MAX,
            started: false,
            pending_pace: false,
        }
    }

    /// Switches to a new song and rebuilds the instrument index
    pub fn reset(&mut self, midi: Arc<Midi>, instruments: &dyn InstrumentTable) {
        info!("Tick stream reset to '{}'", midi.name());
        self.instruments = InstrumentIndex::build(&midi, instruments);
        self.clock.set_tick_duration(midi.tick_duration());
        self.midi = Some(midi);
        self.current_tick = 0;
        self.started = false;
        self.pending_pace = false;
    }

    /// Drops the current song
    pub fn clear(&mut self) {
        self.midi = None;
        self.instruments = InstrumentIndex::default();
        self.current_tick = 0;
        self.started = false;
        self.pending_pace = false;
    }

    pub fn midi(&self) -> Option<&Midi> {
        self.midi.as_deref()
    }

    pub fn instruments(&self) -> &InstrumentIndex {
        &self.instruments
    }

    /// Next tick to be fetched
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Stops the stream before `ceiling` regardless of song length
    pub fn set_max_tick(&mut self, ceiling: u64) {
        self.ceiling = ceiling;
    }

    pub fn has_more(&self) -> bool {
        match &self.midi {
            Some(midi) => self.current_tick <= midi.max_tick() && self.current_tick < self.ceiling,
            None => false,
        }
    }

    /// Returns the next non-empty batch of notes
    ///
    /// The previous tick is waited out before each fetch and empty ticks are
    /// paced and skipped, so the caller gets a batch right when its tick
    /// begins. Past the end an empty batch comes back with `has_more` unset.
    pub fn advance(&mut self) -> Advance {
        let Some(midi) = self.midi.clone() else {
            return Advance::default();
        };

        while self.has_more() {
            self.pace_pending();
            if !self.started {
                self.clock.start();
                self.started = true;
            }

            let events: Vec<NoteEvent> = midi.notes_at(self.current_tick).cloned().collect();
            let tick = self.current_tick;
            self.current_tick += 1;
            self.pending_pace = true;

            if !events.is_empty() {
                trace!("Tick {}: {} notes", tick, events.len());
                return Advance {
                    events,
                    has_more: self.has_more(),
                };
            }
        }

        Advance::default()
    }

    /// Paces the tick last returned by [`advance`](Self::advance) without
    /// fetching anything. Repeated calls before the next advance are no-ops.
    pub fn wait_only(&mut self) {
        if self.midi.is_some() {
            self.pace_pending();
        }
    }

    fn pace_pending(&mut self) {
        if self.pending_pace {
            self.clock.wait_for_next_tick();
            self.pending_pace = false;
        }
    }
}
