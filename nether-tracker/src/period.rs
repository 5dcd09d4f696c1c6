//! Amiga period table
//!
//! One octave of ProTracker periods for each of the 16 finetune settings,
//! extended downward in pitch by halving. Index 0 of every row is the
//! lowest note.

use crate::pattern::NoteValue;

/// Number of octaves in the extended table
pub const PERIOD_TABLE_OCTAVES: usize = 7;

/// Notes per finetune row
pub const PERIOD_TABLE_NOTES: usize = 12 * PERIOD_TABLE_OCTAVES;

/// Base octave, finetune order 0..7 then -8..-1 (the MOD nibble order)
const BASE_PERIODS: [[u16; 12]; 16] = [
    [856, 808, 762, 720, 678, 640, 604, 570, 538, 508, 480, 453],
    [850, 802, 757, 715, 674, 637, 601, 567, 535, 505, 477, 450],
    [844, 796, 752, 709, 670, 632, 597, 563, 532, 501, 474, 447],
    [838, 791, 746, 704, 665, 628, 592, 559, 528, 498, 470, 444],
    [832, 785, 741, 699, 660, 623, 588, 555, 524, 494, 467, 441],
    [826, 779, 736, 694, 655, 619, 584, 551, 520, 491, 463, 437],
    [820, 774, 730, 689, 651, 614, 580, 547, 516, 487, 460, 434],
    [814, 768, 725, 684, 646, 610, 575, 543, 513, 484, 457, 431],
    [907, 856, 808, 762, 720, 678, 640, 604, 570, 538, 508, 480],
    [900, 850, 802, 757, 715, 675, 636, 601, 567, 535, 505, 477],
    [894, 844, 796, 752, 709, 670, 632, 597, 563, 532, 501, 474],
    [887, 838, 791, 746, 704, 665, 628, 592, 559, 528, 498, 470],
    [881, 832, 785, 741, 699, 660, 623, 588, 555, 524, 495, 467],
    [875, 826, 779, 736, 694, 655, 619, 584, 551, 520, 491, 463],
    [868, 820, 774, 730, 689, 651, 614, 580, 547, 516, 487, 460],
    [862, 814, 768, 725, 684, 646, 610, 575, 543, 513, 484, 457],
];

/// Extended table: 16 finetunes × 84 notes
static PERIOD_TABLE: [[u16; PERIOD_TABLE_NOTES]; 16] = {
    let mut table = [[0u16; PERIOD_TABLE_NOTES]; 16];
    let mut ft = 0;
    while ft < 16 {
        let mut octave = 0;
        while octave < PERIOD_TABLE_OCTAVES {
            let mut note = 0;
            while note < 12 {
                table[ft][octave * 12 + note] = BASE_PERIODS[ft][note] >> octave;
                note += 1;
            }
            octave += 1;
        }
        ft += 1;
    }
    table
};

/// Smallest period in the table (highest pitch)
pub const MIN_PERIOD: i32 = (BASE_PERIODS[0][11] >> (PERIOD_TABLE_OCTAVES - 1)) as i32;

/// Largest period in the table at finetune 0 (lowest pitch)
pub const MAX_PERIOD: i32 = BASE_PERIODS[0][0] as i32;

/// Periods for one finetune nibble (0-15)
pub fn period_table(finetune: u8) -> &'static [u16; PERIOD_TABLE_NOTES] {
    &PERIOD_TABLE[finetune_to_table_index(finetune)]
}

/// MOD finetune nibble to table row
#[inline]
pub fn finetune_to_table_index(finetune: u8) -> usize {
    (finetune & 0x0F) as usize
}

/// MOD finetune nibble (0-15) to signed (-8..7)
#[inline]
pub fn finetune_to_signed(finetune: u8) -> i8 {
    let ft = (finetune & 0x0F) as i8;
    if ft < 8 { ft } else { ft - 16 }
}

/// Closest note for a period.
///
/// Ties go to the first (lowest) note. Period 0 means no note.
pub fn period_to_note(period: u16, finetune: u8) -> Option<NoteValue> {
    if period == 0 {
        return None;
    }

    let mut best_dist = u16::MAX;
    let mut best_note = 0;
    for (i, &p) in period_table(finetune).iter().enumerate() {
        let dist = period.abs_diff(p);
        if dist < best_dist {
            best_dist = dist;
            best_note = i;
        }
    }
    Some(NoteValue::Note(best_note as u8))
}
