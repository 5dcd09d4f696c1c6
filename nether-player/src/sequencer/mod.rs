//! Tick sequencer
//!
//! Drives a module one tick at a time:
//! - `row_processing` - tick 0: note triggers and row flow control
//! - `effects` - tick-0 effect semantics
//! - `tick` - continuation effects on the remaining ticks of a row

mod effects;
mod row_processing;
mod tick;


use std::fmt;
use std::sync::Arc;

use nether_tracker::TrackerModule;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::warn;

use crate::channels::ChannelState;
use crate::utils::samples_per_tick;

/// Row change notification: `(order, row)`
pub type RowCallback = Box<dyn FnMut(u16, u16) + Send>;

/// Seed for the random vibrato/tremolo waveform, restored on every reset
const RANDOM_WAVEFORM_SEED: u64 = 0x4E45_5448_4552;

/// Upper bound on ticks replayed by a single seek
const MAX_SEEK_TICKS: u32 = 1_000_000;

/// Tick-driven playback state machine
pub struct Sequencer {
    pub(crate) module: Arc<TrackerModule>,
    pub(crate) sample_rate: u32,

    // Position
    pub(crate) order: u16,
    pub(crate) row: u16,
    pub(crate) tick: u16,

    // Timing
    pub(crate) speed: u16,
    pub(crate) tempo: u16,
    pub(crate) samples_per_tick: u32,

    /// Extra repeats of the current row (EEx)
    pub(crate) pattern_delay: u8,
    /// The current row is being replayed by a pattern delay
    pub(crate) repeating_row: bool,
    pub(crate) finished: bool,

    pub(crate) channels: Vec<ChannelState>,

    // Flow control requested by the row being processed
    pub(crate) pending_jump: Option<u8>,
    pub(crate) pending_break: Option<u8>,
    /// Row to continue at instead of the next one (E6x)
    pub(crate) pending_loop_row: Option<u16>,

    pub(crate) seeking: bool,
    pub(crate) on_row: Option<RowCallback>,
    pub(crate) rng: Pcg32,
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("title", &self.module.title)
            .field("order", &self.order)
            .field("row", &self.row)
            .field("tick", &self.tick)
            .field("speed", &self.speed)
            .field("tempo", &self.tempo)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    /// Create a sequencer positioned at order 0, row 0 with row 0 processed
    pub fn new(module: Arc<TrackerModule>, sample_rate: u32) -> Self {
        let mut sequencer = Self {
            channels: Vec::with_capacity(module.num_channels as usize),
            module,
            sample_rate,
            order: 0,
            row: 0,
            tick: 0,
            speed: 0,
            tempo: 0,
            samples_per_tick: 0,
            pattern_delay: 0,
            repeating_row: false,
            finished: false,
            pending_jump: None,
            pending_break: None,
            pending_loop_row: None,
            seeking: false,
            on_row: None,
            rng: Pcg32::seed_from_u64(RANDOM_WAVEFORM_SEED),
        };
        sequencer.reset();
        sequencer
    }

    /// Restore session-start state and process row 0
    pub fn reset(&mut self) {
        self.order = 0;
        self.row = 0;
        self.tick = 0;
        self.speed = self.module.initial_speed.max(1) as u16;
        self.tempo = self.module.initial_tempo as u16;
        self.samples_per_tick = samples_per_tick(self.tempo, self.sample_rate);
        self.pattern_delay = 0;
        self.repeating_row = false;
        self.pending_jump = None;
        self.pending_break = None;
        self.pending_loop_row = None;
        self.rng = Pcg32::seed_from_u64(RANDOM_WAVEFORM_SEED);

        let module = Arc::clone(&self.module);
        self.channels.clear();
        self.channels.extend(
            (0..module.num_channels as usize).map(|ch| ChannelState::new(module.channel_panning(ch))),
        );

        self.finished = module.pattern_at_order(0).is_none();
        if !self.finished {
            self.process_row();
        }
    }

    /// Jump to `order`/`row` by replaying from the start.
    ///
    /// Channel state ends up exactly as normal playback would leave it.
    /// Row notifications are not fired while replaying.
    pub fn seek(&mut self, order: u16, row: u16) {
        self.seeking = true;
        self.reset();

        let mut ticks = 0;
        while !self.finished && (self.order < order || (self.order == order && self.row < row)) {
            if ticks >= MAX_SEEK_TICKS {
                warn!(order, row, "Seek target not reached, stopping replay");
                break;
            }
            self.advance_tick();
            ticks += 1;
        }

        self.seeking = false;
    }

    /// Advance one tick
    pub fn advance_tick(&mut self) {
        if self.finished {
            return;
        }

        self.tick += 1;
        if self.tick < self.speed {
            let tick = self.tick;
            for ch in 0..self.channels.len() {
                let effect = self.channels[ch].current_effect;
                self.tick_effect(ch, effect, tick);
            }
            return;
        }

        self.tick = 0;

        if self.pattern_delay > 0 {
            self.pattern_delay -= 1;
            self.repeating_row = true;
            self.process_row();
            self.repeating_row = false;
            return;
        }

        self.row = match self.pending_loop_row.take() {
            Some(loop_row) => loop_row,
            None => self.row + 1,
        };
        if self.row >= self.pattern_rows_at(self.order) {
            self.advance_order();
            if self.finished {
                return;
            }
        }
        self.process_row();
    }

    /// Change tempo and recompute the tick length
    pub fn set_tempo(&mut self, tempo: u16) {
        self.tempo = tempo.max(1);
        self.samples_per_tick = samples_per_tick(self.tempo, self.sample_rate);
    }

    /// Install or clear the row change notification
    pub fn set_on_row(&mut self, callback: Option<RowCallback>) {
        self.on_row = callback;
    }

    pub(crate) fn advance_order(&mut self) {
        self.order += 1;
        self.row = 0;
        if self.order >= self.module.song_length() {
            self.finished = true;
        }
    }

    /// Row count of the pattern at `order`, 0 if there is none
    pub(crate) fn pattern_rows_at(&self, order: u16) -> u16 {
        self.module
            .pattern_at_order(order)
            .map_or(0, |pattern| pattern.num_rows)
    }

    // =========================================================================
    // State inspection
    // =========================================================================

    pub fn module(&self) -> &Arc<TrackerModule> {
        &self.module
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn order(&self) -> u16 {
        self.order
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    pub fn tick(&self) -> u16 {
        self.tick
    }

    /// Ticks per row
    pub fn speed(&self) -> u16 {
        self.speed
    }

    /// Beats per minute
    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }

    /// Remaining repeats of the current row
    pub fn pattern_delay(&self) -> u8 {
        self.pattern_delay
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    /// Mutable registers, used by the mixer to persist sample positions
    pub fn channels_mut(&mut self) -> &mut [ChannelState] {
        &mut self.channels
    }
}
