//! Instrument data structures and envelopes

use crate::sample::TrackerSample;

/// Number of entries in an instrument's key map
pub const KEY_MAP_SIZE: usize = 120;

/// Tracker instrument
#[derive(Debug, Clone)]
pub struct TrackerInstrument {
    /// Instrument name
    pub name: String,
    /// Samples owned by this instrument
    pub samples: Vec<TrackerSample>,
    /// Note→sample index mapping (120 entries, indexes `samples`)
    pub key_map: [u8; KEY_MAP_SIZE],
    /// Volume envelope
    pub volume_envelope: Option<TrackerEnvelope>,
    /// Panning envelope
    pub panning_envelope: Option<TrackerEnvelope>,
    /// Pitch envelope
    pub pitch_envelope: Option<TrackerEnvelope>,
    /// New Note Action
    pub nna: NewNoteAction,
    /// Duplicate check policy
    pub duplicate_check: DuplicateCheck,
    /// Fadeout speed (0-1024)
    pub fadeout: u16,
    /// Initial filter cutoff (0-127)
    pub filter_cutoff: Option<u8>,
    /// Initial filter resonance (0-127)
    pub filter_resonance: Option<u8>,
}

impl Default for TrackerInstrument {
    fn default() -> Self {
        Self {
            name: String::new(),
            samples: Vec::new(),
            key_map: [0; KEY_MAP_SIZE],
            volume_envelope: None,
            panning_envelope: None,
            pitch_envelope: None,
            nna: NewNoteAction::Cut,
            duplicate_check: DuplicateCheck::Off,
            fadeout: 0,
            filter_cutoff: None,
            filter_resonance: None,
        }
    }
}

impl TrackerInstrument {
    /// Single-sample instrument, the shape MOD files produce
    pub fn from_sample(sample: TrackerSample) -> Self {
        Self {
            name: sample.name.clone(),
            samples: vec![sample],
            ..Default::default()
        }
    }

    /// Get the sample index for a given note
    pub fn sample_for_note(&self, note: u8) -> Option<usize> {
        let idx = *self.key_map.get(note as usize)? as usize;
        (idx < self.samples.len()).then_some(idx)
    }

    /// Default volume of the first sample, 64 when there is none
    pub fn default_volume(&self) -> u8 {
        self.samples.first().map(|s| s.volume).unwrap_or(64)
    }
}

/// New Note Action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NewNoteAction {
    /// Cut the previous note immediately
    #[default]
    Cut = 0,
    /// Continue playing in background
    Continue = 1,
    /// Release the previous note
    NoteOff = 2,
    /// Fade out the previous note
    NoteFade = 3,
}

/// Duplicate check policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DuplicateCheck {
    /// No duplicate checking
    #[default]
    Off = 0,
    /// Check for same note
    Note = 1,
    /// Check for same sample
    Sample = 2,
    /// Check for same instrument
    Instrument = 3,
}

/// Envelope
#[derive(Debug, Clone)]
pub struct TrackerEnvelope {
    /// Envelope points: (tick, value)
    pub points: Vec<(u16, i16)>,
    /// Sustain point index
    pub sustain_point: Option<u8>,
    /// Loop (start point index, end point index)
    pub loop_points: Option<(u8, u8)>,
    /// Envelope is active
    pub enabled: bool,
}

impl Default for TrackerEnvelope {
    fn default() -> Self {
        Self {
            points: vec![(0, 64), (100, 64)],
            sustain_point: None,
            loop_points: None,
            enabled: true,
        }
    }
}

impl TrackerEnvelope {
    /// Get interpolated value at a given tick
    pub fn value_at(&self, tick: u16) -> i16 {
        let Some(&(_, last)) = self.points.last() else {
            return 64;
        };

        for pair in self.points.windows(2) {
            let (x1, y1) = pair[0];
            let (x2, y2) = pair[1];

            if tick >= x1 && tick < x2 {
                let dx = (x2 - x1) as f32;
                let dy = (y2 - y1) as f32;
                let t = (tick - x1) as f32 / dx;
                return (y1 as f32 + dy * t) as i16;
            }
        }

        // Past the last point
        last
    }
}
