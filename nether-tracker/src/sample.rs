//! Sample data structures

/// Default sample rate for samples that do not declare one (Amiga C-2)
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 8363;

/// Raw PCM payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleData {
    /// Signed 8-bit PCM
    I8(Vec<i8>),
    /// Signed 16-bit PCM
    I16(Vec<i16>),
}

impl SampleData {
    /// Number of sample frames
    pub fn frame_count(&self) -> usize {
        match self {
            SampleData::I8(data) => data.len(),
            SampleData::I16(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }
}

impl Default for SampleData {
    fn default() -> Self {
        SampleData::I8(Vec::new())
    }
}

/// Tracker sample
#[derive(Debug, Clone)]
pub struct TrackerSample {
    /// Sample name
    pub name: String,
    /// PCM data
    pub data: SampleData,
    /// Playback rate of the unshifted note
    pub sample_rate: u32,
    /// Default volume (0-64)
    pub volume: u8,
    /// Default panning (0-255), None if not set
    pub panning: Option<u8>,
    /// Loop, None if not looping
    pub sample_loop: Option<SampleLoop>,
    /// Sustain loop, None if not set
    pub sustain_loop: Option<SampleLoop>,
    /// Finetune (-8..7)
    pub finetune: i8,
    /// Relative tone (semitones)
    pub relative_tone: i8,

    // =========================================================================
    // Sample auto-vibrato
    // =========================================================================
    /// Auto-vibrato waveform
    pub vibrato_type: WaveformType,
    /// Auto-vibrato speed
    pub vibrato_speed: u8,
    /// Auto-vibrato depth
    pub vibrato_depth: u8,
    /// Auto-vibrato sweep
    pub vibrato_sweep: u8,
}

impl Default for TrackerSample {
    fn default() -> Self {
        Self {
            name: String::new(),
            data: SampleData::default(),
            sample_rate: DEFAULT_SAMPLE_RATE_HZ,
            volume: 64,
            panning: None,
            sample_loop: None,
            sustain_loop: None,
            finetune: 0,
            relative_tone: 0,
            vibrato_type: WaveformType::Sine,
            vibrato_speed: 0,
            vibrato_depth: 0,
            vibrato_sweep: 0,
        }
    }
}

/// Loop region in sample frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLoop {
    pub start: u32,
    pub length: u32,
    pub loop_type: LoopType,
}

impl SampleLoop {
    pub fn forward(start: u32, length: u32) -> Self {
        Self {
            start,
            length,
            loop_type: LoopType::Forward,
        }
    }

    /// One past the last looped frame
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.length)
    }

    /// Fit the loop inside `frames` sample frames.
    ///
    /// Returns None when the loop already fits.
    pub fn clamped_to(&self, frames: u32) -> Option<SampleLoop> {
        if self.end() <= frames {
            return None;
        }
        let start = self.start.min(frames);
        Some(SampleLoop {
            start,
            length: frames - start,
            loop_type: self.loop_type,
        })
    }
}

/// Sample loop type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopType {
    /// Forward loop
    #[default]
    Forward,
    /// Ping-pong (bidirectional) loop
    PingPong,
    /// Backward loop
    Backward,
}

/// Oscillator shape for vibrato and tremolo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WaveformType {
    #[default]
    Sine = 0,
    RampDown = 1,
    Square = 2,
    Random = 3,
}

impl WaveformType {
    /// Decode the low two bits of an E4x/E7x parameter
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::Sine,
            1 => Self::RampDown,
            2 => Self::Square,
            _ => Self::Random,
        }
    }
}
