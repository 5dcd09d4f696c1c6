//! Pattern command - dump cells in playback order

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nether_tracker::{NoteValue, TrackerModule, TrackerNote};

use crate::cli::Span;
use crate::load::load_module;

const NOTE_NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Arguments for the pattern command
#[derive(Args)]
pub struct PatternArgs {
    /// Path to the MOD file
    pub file: PathBuf,

    /// Orders to dump: `N` for one order, `START:END` for a range
    pub orders: Option<Span>,

    /// Rows to dump: `START` to the end of the pattern, or `START:END`
    pub rows: Option<Span>,
}

/// Execute the pattern command
pub fn execute(args: PatternArgs) -> Result<()> {
    let loaded = load_module(&args.file)?;
    let stdout = io::stdout();
    write_patterns(&mut stdout.lock(), &loaded.module, args.orders, args.rows)?;
    Ok(())
}

pub fn write_patterns(
    out: &mut impl Write,
    module: &TrackerModule,
    orders: Option<Span>,
    rows: Option<Span>,
) -> io::Result<()> {
    let song_length = module.song_length();
    if song_length == 0 {
        return Ok(());
    }

    let (first_order, last_order) = match orders {
        Some(span) => (span.start, span.end.unwrap_or(span.start)),
        None => (0, song_length - 1),
    };
    let first_row = rows.map_or(0, |span| span.start);
    let last_row = rows.and_then(|span| span.end);

    for order in first_order..=last_order.min(song_length - 1) {
        let Some(&pattern_index) = module.order_table.get(order as usize) else {
            break;
        };
        let Some(pattern) = module.pattern_at_order(order) else {
            continue;
        };

        writeln!(out, "--- Order {order} (Pattern {pattern_index}) ---")?;
        let mut header = String::from("Row");
        for ch in 1..=module.num_channels {
            header.push_str(&format!(" | Ch{ch:<13}"));
        }
        writeln!(out, "{}", header.trim_end())?;

        let end = last_row
            .unwrap_or(u16::MAX)
            .min(pattern.num_rows.saturating_sub(1));
        for row in first_row..=end {
            let Some(cells) = pattern.row(row) else {
                break;
            };
            let mut line = format!("{row:02} ");
            for cell in cells {
                line.push_str(" | ");
                line.push_str(&format_cell(cell));
            }
            writeln!(out, "{line}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Note name with display octave, e.g. `C-3` for table index 12
pub fn note_name(note: NoteValue) -> String {
    match note {
        NoteValue::Note(index) => {
            let octave = index / 12 + 2;
            format!("{}{octave}", NOTE_NAMES[(index % 12) as usize])
        }
        NoteValue::Off => "===".to_string(),
        NoteValue::Cut => "^^^".to_string(),
        NoteValue::Fade => "~~~".to_string(),
    }
}

/// Effect command as a single hex-like letter
fn effect_letter(command: u8) -> char {
    char::from_digit(u32::from(command), 36).map_or('?', |c| c.to_ascii_uppercase())
}

/// One cell as `C-3(428) 01 C20`, blanks as dots
pub fn format_cell(note: &TrackerNote) -> String {
    let pitch = match (note.note, note.period) {
        (Some(value), Some(period)) => format!("{}({period:3})", note_name(value)),
        (None, Some(period)) => format!("???({period:3})"),
        (Some(value), None) => format!("{:<8}", note_name(value)),
        (None, None) => "...     ".to_string(),
    };

    let instrument = match note.instrument {
        Some(number) if number > 0 => format!("{number:02X}"),
        _ => "..".to_string(),
    };

    let effect = match note.raw_effect {
        Some((command, param)) if command != 0 || param != 0 => {
            format!("{}{param:02X}", effect_letter(command))
        }
        _ => "...".to_string(),
    };

    format!("{pitch} {instrument} {effect}")
}
