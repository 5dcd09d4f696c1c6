//! Nether-MOD: ProTracker MOD decoder
//!
//! Decodes the classic Amiga module layout (and its multichannel
//! variants) into a [`TrackerModule`]. Loading either fails before any
//! module exists or succeeds with a best-effort module whose problems are
//! listed in `TrackerModule::warnings`.
//!
//! # MOD Format Overview
//!
//! ```text
//! [20B title]
//! [31 × 30B sample header: name, length, finetune, volume, loop start, loop length]
//! [1B song length][1B restart][128B order table]
//! [4B signature at offset 1080]
//! [patterns: 64 rows × channels × 4B cells]
//! [sample PCM, signed 8-bit]
//! ```
//!
//! All 16-bit header fields are big-endian word counts.
//!
//! # Usage
//!
//! ```ignore
//! use nether_mod::{ModLoader, registry};
//!
//! let data = std::fs::read("song.mod")?;
//! let module = registry().load(&data)?;
//!
//! println!("Song: {}", module.title);
//! println!("Channels: {}", module.num_channels);
//! for warning in &module.warnings {
//!     println!("  warning: {warning}");
//! }
//! ```

mod cursor;
mod parser;
mod signature;

pub use cursor::BinaryReader;
pub use parser::{decode_effect, decode_note, parse_mod};
pub use signature::{channels_for_signature, identify};

use nether_tracker::{FormatError, FormatLoader, FormatRegistry, TrackerModule};

// =============================================================================
// Layout Constants
// =============================================================================

/// Bytes before the first pattern
pub const MOD_HEADER_SIZE: usize = 1084;

/// Offset of the 4-byte format signature
pub const SIGNATURE_OFFSET: usize = 1080;

/// Title field length
pub const TITLE_LENGTH: usize = 20;

/// Sample name field length
pub const SAMPLE_NAME_LENGTH: usize = 22;

/// Number of sample headers
pub const NUM_SAMPLES: usize = 31;

/// Entries in the order table
pub const ORDER_TABLE_SIZE: usize = 128;

/// Rows in every MOD pattern
pub const ROWS_PER_PATTERN: u16 = 64;

/// Bytes per pattern cell
pub const CELL_SIZE: usize = 4;

/// Highest channel count a signature may declare
pub const MAX_CHANNELS: u8 = 32;

/// Loops this short (in bytes) mean "no loop"
pub const MIN_LOOP_LENGTH: u32 = 2;

/// Score returned for a recognized signature
pub const IDENTIFY_SCORE: u32 = 100;

/// Default panning: left, right, right, left
pub const AMIGA_PANNING: [u8; 4] = [64, 192, 192, 64];

// =============================================================================
// Effect Constants
// =============================================================================

/// MOD effect commands for reference
pub mod effects {
    /// 0xy - Arpeggio
    pub const ARPEGGIO: u8 = 0x0;
    /// 1xx - Portamento up
    pub const PORTA_UP: u8 = 0x1;
    /// 2xx - Portamento down
    pub const PORTA_DOWN: u8 = 0x2;
    /// 3xx - Tone portamento
    pub const TONE_PORTA: u8 = 0x3;
    /// 4xy - Vibrato
    pub const VIBRATO: u8 = 0x4;
    /// 5xy - Tone portamento + volume slide
    pub const TONE_PORTA_VOL_SLIDE: u8 = 0x5;
    /// 6xy - Vibrato + volume slide
    pub const VIBRATO_VOL_SLIDE: u8 = 0x6;
    /// 7xy - Tremolo
    pub const TREMOLO: u8 = 0x7;
    /// 8xx - Set panning
    pub const SET_PANNING: u8 = 0x8;
    /// 9xx - Sample offset
    pub const SAMPLE_OFFSET: u8 = 0x9;
    /// Axy - Volume slide
    pub const VOLUME_SLIDE: u8 = 0xA;
    /// Bxx - Position jump
    pub const POSITION_JUMP: u8 = 0xB;
    /// Cxx - Set volume
    pub const SET_VOLUME: u8 = 0xC;
    /// Dxy - Pattern break
    pub const PATTERN_BREAK: u8 = 0xD;
    /// Exy - Extended effects
    pub const EXTENDED: u8 = 0xE;
    /// Fxx - Set speed/tempo
    pub const SET_SPEED_TEMPO: u8 = 0xF;

    /// Fxx parameters up to this value set speed, above it tempo
    pub const SPEED_TEMPO_SPLIT: u8 = 32;

    /// Extended effect sub-commands (high nibble of the Exy parameter)
    pub mod extended {
        pub const FILTER: u8 = 0x0;
        pub const FINE_PORTA_UP: u8 = 0x1;
        pub const FINE_PORTA_DOWN: u8 = 0x2;
        pub const GLISSANDO: u8 = 0x3;
        pub const VIBRATO_WAVEFORM: u8 = 0x4;
        pub const SET_FINETUNE: u8 = 0x5;
        pub const PATTERN_LOOP: u8 = 0x6;
        pub const TREMOLO_WAVEFORM: u8 = 0x7;
        pub const RETRIGGER: u8 = 0x9;
        pub const FINE_VOLUME_UP: u8 = 0xA;
        pub const FINE_VOLUME_DOWN: u8 = 0xB;
        pub const NOTE_CUT: u8 = 0xC;
        pub const NOTE_DELAY: u8 = 0xD;
        pub const PATTERN_DELAY: u8 = 0xE;
    }
}

// =============================================================================
// Loader
// =============================================================================

/// [`FormatLoader`] for ProTracker MOD files
#[derive(Debug, Clone, Copy, Default)]
pub struct ModLoader;

impl FormatLoader for ModLoader {
    fn name(&self) -> &'static str {
        "ProTracker MOD"
    }

    fn identify(&self, data: &[u8]) -> u32 {
        identify(data)
    }

    fn load(&self, data: &[u8]) -> Result<TrackerModule, FormatError> {
        parse_mod(data)
    }
}

/// Registry with every decoder this crate provides
pub fn registry() -> FormatRegistry {
    FormatRegistry::new().with(ModLoader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout_adds_up() {
        let sample_headers = NUM_SAMPLES * (SAMPLE_NAME_LENGTH + 8);
        assert_eq!(
            TITLE_LENGTH + sample_headers + 2 + ORDER_TABLE_SIZE,
            SIGNATURE_OFFSET
        );
        assert_eq!(SIGNATURE_OFFSET + 4, MOD_HEADER_SIZE);
    }

    #[test]
    fn test_registry_has_mod_loader() {
        let registry = registry();
        assert_eq!(registry.len(), 1);
        assert!(registry.identify(&[0u8; 16]).is_none());
    }
}
