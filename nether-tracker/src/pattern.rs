//! Pattern and note data structures

use crate::effects::{TrackerEffect, VolumeEffect};

/// Tracker pattern
#[derive(Debug, Clone)]
pub struct TrackerPattern {
    /// Number of rows (1-256)
    pub num_rows: u16,
    /// Note data: [row][channel]
    pub notes: Vec<Vec<TrackerNote>>,
}

impl TrackerPattern {
    /// Get note at specific row and channel
    pub fn get_note(&self, row: u16, channel: u8) -> Option<&TrackerNote> {
        self.notes.get(row as usize)?.get(channel as usize)
    }

    /// Get a full row
    pub fn row(&self, row: u16) -> Option<&[TrackerNote]> {
        self.notes.get(row as usize).map(Vec::as_slice)
    }

    /// Create an empty pattern
    pub fn empty(num_rows: u16, num_channels: u8) -> Self {
        let mut notes = Vec::with_capacity(num_rows as usize);
        for _ in 0..num_rows {
            notes.push(vec![TrackerNote::default(); num_channels as usize]);
        }
        Self { num_rows, notes }
    }
}

/// Pitch column value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValue {
    /// Semitone index (0 = lowest note of the period table)
    Note(u8),
    /// Release the note
    Off,
    /// Silence the note immediately
    Cut,
    /// Fade the note out
    Fade,
}

/// Single cell in a pattern
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackerNote {
    /// Note value
    pub note: Option<NoteValue>,
    /// Raw period (None = no note)
    pub period: Option<u16>,
    /// Instrument number (1-based)
    pub instrument: Option<u8>,
    /// Volume column (0-64)
    pub volume: Option<u8>,
    /// Volume column effect
    pub volume_effect: Option<VolumeEffect>,
    /// Decoded effect
    pub effect: TrackerEffect,
    /// Source effect command and parameter, verbatim
    pub raw_effect: Option<(u8, u8)>,
}

impl TrackerNote {
    /// A cell carrying only an effect
    pub fn with_effect(effect: TrackerEffect) -> Self {
        Self {
            effect,
            ..Default::default()
        }
    }

    /// Check if this has a pitch to trigger
    pub fn has_period(&self) -> bool {
        self.period.is_some_and(|p| p > 0)
    }

    /// Check if this has an instrument
    pub fn has_instrument(&self) -> bool {
        self.instrument.is_some_and(|i| i > 0)
    }

    /// Check if there's an effect
    pub fn has_effect(&self) -> bool {
        !matches!(self.effect, TrackerEffect::None)
    }

    /// Check if the cell is completely blank
    pub fn is_empty(&self) -> bool {
        self.note.is_none()
            && self.period.is_none()
            && self.instrument.is_none()
            && self.volume.is_none()
            && self.volume_effect.is_none()
            && !self.has_effect()
            && self.raw_effect.is_none()
    }
}
