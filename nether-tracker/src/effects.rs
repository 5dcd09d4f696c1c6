//! Tracker effect system
//!
//! Effects are decoded once by the loader into [`TrackerEffect`]. The player
//! matches on it twice: once when a row starts (tick 0) and once for every
//! following tick of the row.

/// Decoded main-column effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerEffect {
    /// No effect
    #[default]
    None,

    // =========================================================================
    // Speed and Tempo
    // =========================================================================
    /// Set speed (ticks per row)
    /// MOD: Fxx with xx <= 0x20
    SetSpeed(u8),

    /// Set tempo (BPM)
    /// MOD: Fxx with xx > 0x20
    SetTempo(u8),

    // =========================================================================
    // Pattern Flow Control
    // =========================================================================
    /// Jump to order position
    /// MOD: Bxx
    PositionJump(u8),

    /// Break to row in next pattern (already converted from BCD)
    /// MOD: Dxy
    PatternBreak(u8),

    /// Repeat the current row this many extra times
    /// MOD: EEx
    PatternDelay(u8),

    /// Pattern loop (0 = set anchor, n = repeat n times)
    /// MOD: E6x
    PatternLoop(u8),

    // =========================================================================
    // Volume Effects
    // =========================================================================
    /// Set volume (0-64)
    /// MOD: Cxx
    SetVolume(u8),

    /// Volume slide
    /// MOD: Axy
    VolumeSlide { up: u8, down: u8 },

    /// Fine volume slide up (tick 0 only)
    /// MOD: EAx
    FineVolumeUp(u8),

    /// Fine volume slide down (tick 0 only)
    /// MOD: EBx
    FineVolumeDown(u8),

    // =========================================================================
    // Pitch Effects
    // =========================================================================
    /// Pitch slide up (period decreases)
    /// MOD: 1xx
    PortamentoUp(u8),

    /// Pitch slide down (period increases)
    /// MOD: 2xx
    PortamentoDown(u8),

    /// Fine pitch slide up (tick 0 only)
    /// MOD: E1x
    FinePortaUp(u8),

    /// Fine pitch slide down (tick 0 only)
    /// MOD: E2x
    FinePortaDown(u8),

    /// Slide toward the row's note
    /// MOD: 3xx
    TonePortamento(u8),

    /// Continue tone portamento while sliding volume
    /// MOD: 5xy
    TonePortaVolSlide { vol_up: u8, vol_down: u8 },

    // =========================================================================
    // Modulation Effects
    // =========================================================================
    /// Vibrato
    /// MOD: 4xy
    Vibrato { speed: u8, depth: u8 },

    /// Continue vibrato while sliding volume
    /// MOD: 6xy
    VibratoVolSlide { vol_up: u8, vol_down: u8 },

    /// Tremolo
    /// MOD: 7xy
    Tremolo { speed: u8, depth: u8 },

    /// Arpeggio (semitone offsets)
    /// MOD: 0xy with xy != 0
    Arpeggio { note1: u8, note2: u8 },

    // =========================================================================
    // Panning Effects
    // =========================================================================
    /// Set panning (0-255)
    /// MOD: 8xx
    SetPanning(u8),

    // =========================================================================
    // Sample Effects
    // =========================================================================
    /// Start the sample at `param * 256` frames
    /// MOD: 9xx
    SampleOffset(u8),

    /// Restart the sample every n ticks
    /// MOD: E9x
    Retrigger(u8),

    /// Cut volume at tick n
    /// MOD: ECx
    NoteCut(u8),

    /// Hold the note back until tick n
    /// MOD: EDx
    NoteDelay(u8),

    /// Override sample finetune (raw nibble)
    /// MOD: E5x
    SetFinetune(u8),

    // =========================================================================
    // Waveform Control
    // =========================================================================
    /// Vibrato waveform (bits 0-1) and no-retrigger flag (bit 2)
    /// MOD: E4x
    VibratoWaveform(u8),

    /// Tremolo waveform (bits 0-1) and no-retrigger flag (bit 2)
    /// MOD: E7x
    TremoloWaveform(u8),

    // =========================================================================
    // Other Effects
    // =========================================================================
    /// Amiga LED filter (true = on)
    /// MOD: E0x
    SetFilter(bool),

    /// Glissando control
    /// MOD: E3x
    SetGlissando(bool),
}

impl TrackerEffect {
    /// Check if this effect modifies pitch
    pub fn affects_pitch(&self) -> bool {
        matches!(
            self,
            Self::PortamentoUp(_)
                | Self::PortamentoDown(_)
                | Self::FinePortaUp(_)
                | Self::FinePortaDown(_)
                | Self::TonePortamento(_)
                | Self::TonePortaVolSlide { .. }
                | Self::Vibrato { .. }
                | Self::VibratoVolSlide { .. }
                | Self::Arpeggio { .. }
        )
    }

    /// Check if this effect modifies volume
    pub fn affects_volume(&self) -> bool {
        matches!(
            self,
            Self::SetVolume(_)
                | Self::VolumeSlide { .. }
                | Self::FineVolumeUp(_)
                | Self::FineVolumeDown(_)
                | Self::TonePortaVolSlide { .. }
                | Self::VibratoVolSlide { .. }
                | Self::Tremolo { .. }
                | Self::NoteCut(_)
        )
    }

    /// Check if this effect changes the playback position
    pub fn affects_pattern_flow(&self) -> bool {
        matches!(
            self,
            Self::PositionJump(_)
                | Self::PatternBreak(_)
                | Self::PatternDelay(_)
                | Self::PatternLoop(_)
        )
    }

    /// Tone portamento turns a note into a slide target instead of a trigger
    pub fn is_tone_portamento(&self) -> bool {
        matches!(
            self,
            Self::TonePortamento(_) | Self::TonePortaVolSlide { .. }
        )
    }
}

/// Decoded volume-column effect (formats with a volume column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeEffect {
    SetVolume(u8),
    VolumeSlideUp(u8),
    VolumeSlideDown(u8),
    FineVolumeSlideUp(u8),
    FineVolumeSlideDown(u8),
    VibratoSpeed(u8),
    VibratoDepth(u8),
    SetPanning(u8),
    PanningSlideLeft(u8),
    PanningSlideRight(u8),
    TonePortamento(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_categories() {
        let porta_down = TrackerEffect::PortamentoDown(4);
        assert!(porta_down.affects_pitch());
        assert!(!porta_down.affects_volume());

        let vol_slide = TrackerEffect::VolumeSlide { up: 5, down: 0 };
        assert!(vol_slide.affects_volume());
        assert!(!vol_slide.affects_pitch());

        let pattern_break = TrackerEffect::PatternBreak(16);
        assert!(pattern_break.affects_pattern_flow());
        assert!(!pattern_break.affects_pitch());
    }

    #[test]
    fn test_combined_effects_touch_both() {
        let effect = TrackerEffect::VibratoVolSlide {
            vol_up: 0,
            vol_down: 2,
        };
        assert!(effect.affects_pitch());
        assert!(effect.affects_volume());
    }

    #[test]
    fn test_tone_portamento_detection() {
        assert!(TrackerEffect::TonePortamento(0).is_tone_portamento());
        assert!(
            TrackerEffect::TonePortaVolSlide {
                vol_up: 1,
                vol_down: 0
            }
            .is_tone_portamento()
        );
        assert!(!TrackerEffect::PortamentoUp(1).is_tone_portamento());
    }

    #[test]
    fn test_default_effect() {
        let effect = TrackerEffect::default();
        assert_eq!(effect, TrackerEffect::None);
    }
}
