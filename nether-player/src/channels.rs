//! Channel register file
//!
//! Per-channel playback state written by the sequencer and read by the
//! mixer. Effect memory lives here rather than on effects: the volume slide
//! cell is shared by `A`, `5` and `6`, the portamento speed by `3` and `5`,
//! and every cell survives until a nonzero parameter overwrites it.

use nether_tracker::{MAX_PERIOD, MIN_PERIOD, PAN_CENTER, TrackerEffect, WaveformType};
use rand::Rng;

use crate::utils::{clamp_volume, waveform_amplitude};

#[cfg(test)]
mod tests;

/// Vibrato or tremolo oscillator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Oscillator {
    /// Phase advance per tick
    pub speed: u8,
    /// Depth multiplier
    pub depth: u8,
    /// Phase (0-63)
    pub position: u8,
    pub waveform: WaveformType,
    /// Keep the phase when a note triggers
    pub no_retrigger: bool,
    /// Current offset, period units for vibrato and volume units for tremolo
    pub offset: i32,
}

impl Oscillator {
    /// Store nonzero speed/depth parameters
    pub fn remember(&mut self, speed: u8, depth: u8) {
        if speed != 0 {
            self.speed = speed;
        }
        if depth != 0 {
            self.depth = depth;
        }
    }

    /// Apply an E4x/E7x parameter: waveform in bits 0-1, no-retrigger in bit 2
    pub fn set_waveform(&mut self, param: u8) {
        self.waveform = WaveformType::from_bits(param);
        self.no_retrigger = param & 4 != 0;
    }

    /// Reset the phase for a new note unless retrigger is disabled
    pub fn retrigger(&mut self) {
        if !self.no_retrigger {
            self.position = 0;
        }
    }

    /// Compute this tick's offset and advance the phase
    pub fn step(&mut self, rng: &mut impl Rng) -> i32 {
        let amplitude = waveform_amplitude(self.waveform, self.position, rng);
        self.offset = amplitude * self.depth as i32 / 128;
        self.position = self.position.wrapping_add(self.speed) & 63;
        self.offset
    }
}

/// Playback registers for one channel
#[derive(Debug, Clone)]
pub struct ChannelState {
    // Instrument
    /// 0-based index into the module's instruments
    pub instrument_index: usize,
    /// Index into the instrument's samples
    pub sample_index: usize,

    // Playback position
    /// Fractional read position in sample frames
    pub position: f64,
    pub playing: bool,

    // Pitch
    pub period: i32,
    /// Tone portamento destination
    pub target_period: i32,

    // Volume and panning
    /// 0-64
    pub volume: i32,
    /// 0 = left, 128 = center, 255 = right
    pub panning: u8,

    /// Effect dispatched on ticks after the first
    pub current_effect: TrackerEffect,

    // Pitch slide memory (1xx, 2xx, 3xx/5xy)
    pub slide_up_speed: i32,
    pub slide_down_speed: i32,
    pub porta_speed: i32,

    // Modulation (4xy/6xy, 7xy)
    pub vibrato: Oscillator,
    pub tremolo: Oscillator,

    /// Volume slide memory, up in the high nibble (Axy/5xy/6xy)
    pub volume_slide: u8,

    // Arpeggio (0xy)
    pub arpeggio_x: u8,
    pub arpeggio_y: u8,
    /// Period to restore at the next row, 0 when arpeggio is idle
    pub arpeggio_base: i32,

    /// Sample offset memory in frames (9xx)
    pub sample_offset_memory: u32,
    /// Retrigger interval in ticks (E9x)
    pub retrigger_interval: u8,

    // Note delay payload (EDx)
    pub delayed_instrument: Option<u8>,
    pub delayed_period: Option<u16>,

    // Pattern loop (E6x), scoped per channel
    pub pattern_loop_row: u16,
    pub pattern_loop_count: u8,

    // Free-running counters for the live sequencer
    pub channel_tick: u16,
    pub channel_row: u16,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new(PAN_CENTER)
    }
}

impl ChannelState {
    /// Silent channel at the given panning
    pub fn new(panning: u8) -> Self {
        Self {
            instrument_index: 0,
            sample_index: 0,
            position: 0.0,
            playing: false,
            period: 0,
            target_period: 0,
            volume: 0,
            panning,
            current_effect: TrackerEffect::None,
            slide_up_speed: 0,
            slide_down_speed: 0,
            porta_speed: 0,
            vibrato: Oscillator::default(),
            tremolo: Oscillator::default(),
            volume_slide: 0,
            arpeggio_x: 0,
            arpeggio_y: 0,
            arpeggio_base: 0,
            sample_offset_memory: 0,
            retrigger_interval: 0,
            delayed_instrument: None,
            delayed_period: None,
            pattern_loop_row: 0,
            pattern_loop_count: 0,
            channel_tick: 0,
            channel_row: 0,
        }
    }

    /// Row-start housekeeping: drop modulation offsets, undo arpeggio
    pub fn begin_row(&mut self) {
        self.vibrato.offset = 0;
        self.tremolo.offset = 0;
        if self.arpeggio_base > 0 {
            self.period = self.arpeggio_base;
            self.arpeggio_base = 0;
        }
    }

    /// Switch instrument. Does not restart playback.
    pub fn select_instrument(&mut self, instrument_index: usize, volume: u8) {
        self.instrument_index = instrument_index;
        self.sample_index = 0;
        self.volume = clamp_volume(volume as i32);
    }

    /// Start a note at `period` from the beginning of the sample
    pub fn trigger(&mut self, period: i32) {
        self.period = period;
        self.target_period = period;
        self.position = 0.0;
        self.playing = true;
        self.vibrato.retrigger();
        self.tremolo.retrigger();
    }

    /// Stop output without touching effect memory
    pub fn silence(&mut self) {
        self.playing = false;
        self.volume = 0;
        self.period = 0;
        self.current_effect = TrackerEffect::None;
        self.channel_tick = 0;
    }

    /// Store a packed volume slide parameter if nonzero
    pub fn remember_volume_slide(&mut self, up: u8, down: u8) {
        let packed = ((up & 0x0F) << 4) | (down & 0x0F);
        if packed != 0 {
            self.volume_slide = packed;
        }
    }

    /// One step of the remembered volume slide. Up wins when both are set.
    pub fn slide_volume(&mut self) {
        let up = (self.volume_slide >> 4) as i32;
        let down = (self.volume_slide & 0x0F) as i32;
        self.volume = if up > 0 {
            clamp_volume(self.volume + up)
        } else {
            clamp_volume(self.volume - down)
        };
    }

    /// One step toward the portamento target, never past it
    pub fn tone_portamento(&mut self) {
        let target = self.target_period;
        if target <= 0 {
            return;
        }
        if self.period < target {
            self.period = (self.period + self.porta_speed).min(target);
        } else if self.period > target {
            self.period = (self.period - self.porta_speed).max(target);
        }
    }

    /// Raise pitch by `amount` period units, clamped to the table
    pub fn slide_period_up(&mut self, amount: i32) {
        self.period = (self.period - amount).max(MIN_PERIOD);
    }

    /// Lower pitch by `amount` period units.
    ///
    /// Clamps at [`MAX_PERIOD`], or at the current period when a
    /// negative-finetune note already sits below it.
    pub fn slide_period_down(&mut self, amount: i32) {
        let floor = MAX_PERIOD.max(self.period);
        self.period = (self.period + amount).min(floor);
    }

    /// Period the mixer should play, vibrato included
    pub fn effective_period(&self) -> i32 {
        (self.period + self.vibrato.offset).max(MIN_PERIOD)
    }

    /// Volume the mixer should play (0-64), tremolo included
    pub fn effective_volume(&self) -> i32 {
        clamp_volume(self.volume + self.tremolo.offset)
    }
}
