//! Nether-Tracker: song data model for tracker modules
//!
//! This crate holds the immutable representation every format decoder
//! produces and every player consumes. It has no knowledge of any particular
//! file layout; decoders plug in through the [`FormatLoader`] trait and are
//! selected by a [`FormatRegistry`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  MOD File (.mod) │     │  other formats   │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │                        │
//!     ModLoader                (FormatLoader)
//!          │                        │
//!          ▼                        ▼
//!     ┌────────────────────────────────────────┐
//!     │        TrackerModule (immutable)        │
//!     │  - patterns: Vec<TrackerPattern>       │
//!     │  - instruments: Vec<TrackerInstrument> │
//!     │  - hints: FormatHints                  │
//!     │  - warnings: Vec<LoadWarning>          │
//!     └────────────────────────────────────────┘
//!                      │
//!                      ▼
//!          Sequencer + Mixer (nether-player)
//! ```

mod effects;
mod instrument;
mod pattern;
mod period;
mod registry;
mod sample;

#[cfg(test)]
mod tests;

use core::fmt;

pub use effects::{TrackerEffect, VolumeEffect};
pub use instrument::{
    DuplicateCheck, KEY_MAP_SIZE, NewNoteAction, TrackerEnvelope, TrackerInstrument,
};
pub use pattern::{NoteValue, TrackerNote, TrackerPattern};
pub use period::{
    MAX_PERIOD, MIN_PERIOD, PERIOD_TABLE_NOTES, PERIOD_TABLE_OCTAVES, finetune_to_signed,
    finetune_to_table_index, period_table, period_to_note,
};
pub use registry::{FormatError, FormatLoader, FormatRegistry};
pub use sample::{
    DEFAULT_SAMPLE_RATE_HZ, LoopType, SampleData, SampleLoop, TrackerSample, WaveformType,
};

// =============================================================================
// Module Defaults
// =============================================================================

/// Default speed (ticks per row)
pub const DEFAULT_SPEED: u8 = 6;

/// Default tempo (BPM)
pub const DEFAULT_TEMPO: u8 = 125;

/// Default global volume (0-64)
pub const DEFAULT_GLOBAL_VOLUME: u8 = 64;

/// Center panning position
pub const PAN_CENTER: u8 = 128;

// =============================================================================
// Tracker Module
// =============================================================================

/// A decoded song. Never mutated after the loader returns it.
///
/// Invariants upheld by every loader:
/// - each `order_table` entry indexes a pattern in `patterns`
/// - each pattern row holds exactly `num_channels` notes
#[derive(Debug, Clone)]
pub struct TrackerModule {
    /// Song title
    pub title: String,
    /// Human readable format label, e.g. `ProTracker MOD (M.K.)`
    pub format_description: String,
    /// Number of channels (1-32)
    pub num_channels: u8,
    /// Pattern order table (only the played entries)
    pub order_table: Vec<u8>,
    /// Order to restart from when the song loops
    pub restart_position: u8,
    /// Pattern data
    pub patterns: Vec<TrackerPattern>,
    /// Instrument definitions
    pub instruments: Vec<TrackerInstrument>,
    /// Initial speed (ticks per row)
    pub initial_speed: u8,
    /// Initial tempo (BPM)
    pub initial_tempo: u8,
    /// Initial global volume (0-64)
    pub global_volume: u8,
    /// Default panning per channel (0-255). Missing entries mean center.
    pub default_panning: Vec<u8>,
    /// Playback hints from the source format
    pub hints: FormatHints,
    /// Non-fatal problems found while loading
    pub warnings: Vec<LoadWarning>,
}

impl TrackerModule {
    /// Build a module with default timing and no patterns or instruments
    pub fn new(title: impl Into<String>, num_channels: u8, hints: FormatHints) -> Self {
        Self {
            title: title.into(),
            format_description: String::new(),
            num_channels,
            order_table: Vec::new(),
            restart_position: 0,
            patterns: Vec::new(),
            instruments: Vec::new(),
            initial_speed: DEFAULT_SPEED,
            initial_tempo: DEFAULT_TEMPO,
            global_volume: DEFAULT_GLOBAL_VOLUME,
            default_panning: Vec::new(),
            hints,
            warnings: Vec::new(),
        }
    }

    /// Get the pattern at the given order position
    pub fn pattern_at_order(&self, order: u16) -> Option<&TrackerPattern> {
        let pattern_idx = *self.order_table.get(order as usize)? as usize;
        self.patterns.get(pattern_idx)
    }

    /// Number of playable order positions
    pub fn song_length(&self) -> u16 {
        self.order_table.len() as u16
    }

    /// Default panning for a channel, center if the loader gave none
    pub fn channel_panning(&self, channel: usize) -> u8 {
        self.default_panning
            .get(channel)
            .copied()
            .unwrap_or(PAN_CENTER)
    }

    /// Look up an instrument by its 1-based pattern number
    pub fn instrument(&self, number: u8) -> Option<&TrackerInstrument> {
        self.instruments.get((number as usize).checked_sub(1)?)
    }

    /// Check that the order table and pattern shapes hold the module invariants
    pub fn validate(&self) -> Result<(), FormatError> {
        if let Some(bad) = self
            .order_table
            .iter()
            .find(|&&p| p as usize >= self.patterns.len())
        {
            return Err(FormatError::InvalidData(format!(
                "order table references missing pattern {bad}"
            )));
        }
        for (idx, pattern) in self.patterns.iter().enumerate() {
            if pattern.notes.len() != pattern.num_rows as usize {
                return Err(FormatError::InvalidData(format!(
                    "pattern {idx} declares {} rows but holds {}",
                    pattern.num_rows,
                    pattern.notes.len()
                )));
            }
            if pattern
                .notes
                .iter()
                .any(|row| row.len() != self.num_channels as usize)
            {
                return Err(FormatError::InvalidData(format!(
                    "pattern {idx} has a row without {} channels",
                    self.num_channels
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Format Hints
// =============================================================================

/// Playback hints describing where a module came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHints {
    /// Format the module was decoded from
    pub source_format: SourceFormat,
    /// How pitch values should be interpreted
    pub frequency_model: FrequencyModel,
    /// Clamp periods to the Amiga hardware range
    pub amiga_limits: bool,
    /// Channels at zero volume may be skipped by the mixer
    pub zero_volume_optimization: bool,
}

impl FormatHints {
    /// Hints for a format using Amiga periods and no extra behaviour
    pub const fn new(source_format: SourceFormat) -> Self {
        Self {
            source_format,
            frequency_model: FrequencyModel::AmigaPeriods,
            amiga_limits: false,
            zero_volume_optimization: false,
        }
    }
}

/// Original file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Mod,
    S3m,
    Xm,
    It,
}

/// Pitch model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyModel {
    /// Amiga period values (lower = higher pitch)
    #[default]
    AmigaPeriods,
    /// Linear frequency slides
    LinearFrequencies,
}

// =============================================================================
// Load Warnings
// =============================================================================

/// Non-fatal problem recorded while loading a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A loop ran past the sample data and was clamped
    LoopExceedsSampleLength {
        /// 0-based sample index
        sample_index: usize,
        original_start: u32,
        original_length: u32,
        clamped_start: u32,
        clamped_length: u32,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::LoopExceedsSampleLength {
                sample_index,
                original_start,
                original_length,
                clamped_start,
                clamped_length,
            } => write!(
                f,
                "Sample {}: loop {}..+{} exceeds sample length, clamped to {}..+{}",
                sample_index + 1,
                original_start,
                original_length,
                clamped_start,
                clamped_length
            ),
        }
    }
}
