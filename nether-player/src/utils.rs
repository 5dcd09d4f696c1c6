//! Playback helper functions
//!
//! Waveform lookup, timing and pitch arithmetic shared by the sequencers
//! and the mixer.

use nether_tracker::{MIN_PERIOD, WaveformType};
use rand::Rng;

/// 64-step sine for vibrato/tremolo: `trunc(sin(i * π/32) * 255)`
pub const SINE_TABLE: [i16; 64] = [
    0, 24, 49, 74, 97, 120, 141, 161, 180, 197, 212, 224, 235, 244, 250, 253, 255, 253, 250, 244,
    235, 224, 212, 197, 180, 161, 141, 120, 97, 74, 49, 24, 0, -24, -49, -74, -97, -120, -141,
    -161, -180, -197, -212, -224, -235, -244, -250, -253, -255, -253, -250, -244, -235, -224,
    -212, -197, -180, -161, -141, -120, -97, -74, -49, -24,
];

/// Output frames per tick: `floor(sample_rate * 2.5 / tempo)`, at least 1
pub fn samples_per_tick(tempo: u16, sample_rate: u32) -> u32 {
    let tempo = tempo.max(1) as u64;
    ((sample_rate as u64 * 5) / (tempo * 2)).max(1) as u32
}

/// Oscillator amplitude (-255..=255) at a phase position (0-63)
pub fn waveform_amplitude(waveform: WaveformType, position: u8, rng: &mut impl Rng) -> i32 {
    let pos = (position & 63) as i32;
    match waveform {
        WaveformType::Sine => SINE_TABLE[pos as usize] as i32,
        // 0 rising to 248, then -256 rising to -8
        WaveformType::RampDown => {
            if pos < 32 {
                pos * 8
            } else {
                (pos - 64) * 8
            }
        }
        WaveformType::Square => {
            if pos < 32 {
                255
            } else {
                -255
            }
        }
        WaveformType::Random => rng.random_range(-255..=255),
    }
}

/// Period shifted up by a number of semitones.
///
/// Floors the scaled period and never goes below [`MIN_PERIOD`].
pub fn period_for_semitone_offset(base_period: i32, semitones: u8) -> i32 {
    if semitones == 0 {
        return base_period;
    }
    let factor = 2f64.powf(-(semitones as f64) / 12.0);
    ((base_period as f64 * factor).floor() as i32).max(MIN_PERIOD)
}

/// Clamp a volume to 0-64
#[inline]
pub fn clamp_volume(volume: i32) -> i32 {
    volume.clamp(0, 64)
}
