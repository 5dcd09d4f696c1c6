//! State command - sequencer registers once per tick
//!
//! Output is one line per tick:
//!
//! ```text
//! ORD=000 ROW=00 TIC=00 BPM=125 SPD=06  CH00:per=0428 vol=32 smp=01 pan=064 fx=C20  CH01:...
//! ```
//!
//! `per` and `vol` include the current vibrato and tremolo offsets. `fx` is
//! the raw effect of the row being played. Playback stops at the first
//! order/row that was already printed, so songs that loop end cleanly.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use hashbrown::HashSet;
use nether_player::{DEFAULT_SAMPLE_RATE, Sequencer};
use nether_tracker::TrackerModule;
use tracing::debug;

use crate::load::load_module;

/// Arguments for the state command
#[derive(Args)]
pub struct StateArgs {
    /// Path to the MOD file
    pub file: PathBuf,

    /// First order to print (earlier ticks still play silently)
    #[arg(long, default_value_t = 0)]
    pub start_order: u16,

    /// First row to print within the start order
    #[arg(long, default_value_t = 0)]
    pub start_row: u16,

    /// Last order to print
    #[arg(long)]
    pub end_order: Option<u16>,

    /// Last row to print within the end order
    #[arg(long)]
    pub end_row: Option<u16>,
}

/// Inclusive song-position window
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: (u16, u16),
    pub end: (u16, u16),
}

impl From<&StateArgs> for Window {
    fn from(args: &StateArgs) -> Self {
        Self {
            start: (args.start_order, args.start_row),
            end: (
                args.end_order.unwrap_or(u16::MAX),
                args.end_row.unwrap_or(u16::MAX),
            ),
        }
    }
}

/// Execute the state command
pub fn execute(args: StateArgs) -> Result<()> {
    let loaded = load_module(&args.file)?;
    let stdout = io::stdout();
    let lines = write_states(
        &mut stdout.lock(),
        Arc::new(loaded.module),
        Window::from(&args),
    )?;
    debug!(lines, "State dump finished");
    Ok(())
}

/// Play the song from the start and print every tick inside `window`.
///
/// Returns the number of lines written.
pub fn write_states(
    out: &mut impl Write,
    module: Arc<TrackerModule>,
    window: Window,
) -> io::Result<usize> {
    let mut sequencer = Sequencer::new(module, DEFAULT_SAMPLE_RATE);
    let mut visited = HashSet::new();
    let mut previous = None;
    let mut lines = 0;

    while !sequencer.is_finished() {
        let position = (sequencer.order(), sequencer.row());

        if previous != Some(position) {
            if !visited.insert(position) {
                break;
            }
            previous = Some(position);
        }

        if position > window.end {
            break;
        }
        if position >= window.start {
            writeln!(out, "{}", format_state(&sequencer))?;
            lines += 1;
        }

        sequencer.advance_tick();
    }

    Ok(lines)
}

/// One state line for the sequencer's current tick
pub fn format_state(sequencer: &Sequencer) -> String {
    let mut line = format!(
        "ORD={:03} ROW={:02} TIC={:02} BPM={:03} SPD={:02}",
        sequencer.order(),
        sequencer.row(),
        sequencer.tick(),
        sequencer.tempo(),
        sequencer.speed(),
    );

    let cells = sequencer
        .module()
        .pattern_at_order(sequencer.order())
        .and_then(|pattern| pattern.row(sequencer.row()))
        .unwrap_or_default();

    for (ch, channel) in sequencer.channels().iter().enumerate() {
        let period = if channel.period > 0 {
            channel.effective_period()
        } else {
            0
        };
        let volume = channel.effective_volume();
        let sample = if channel.playing || channel.period > 0 {
            channel.instrument_index + 1
        } else {
            0
        };
        let fx = cells
            .get(ch)
            .and_then(|cell| cell.raw_effect)
            .filter(|&(command, param)| command != 0 || param != 0)
            .map_or_else(
                || "---".to_string(),
                |(command, param)| format!("{command:X}{param:02X}"),
            );

        line.push_str(&format!(
            "  CH{ch:02}:per={period:04} vol={volume:02} smp={sample:02} pan={:03} fx={fx}",
            channel.panning
        ));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    fn module(bytes: &[u8]) -> Arc<TrackerModule> {
        Arc::new(nether_mod::parse_mod(bytes).unwrap())
    }

    fn whole_song() -> Window {
        Window {
            start: (0, 0),
            end: (u16::MAX, u16::MAX),
        }
    }

    fn dump(bytes: &[u8], window: Window) -> (Vec<String>, usize) {
        let mut out = Vec::new();
        let count = write_states(&mut out, module(bytes), window).unwrap();
        let text = String::from_utf8(out).unwrap();
        (text.lines().map(str::to_string).collect(), count)
    }

    #[test]
    fn test_first_line_format() {
        let (lines, _) = dump(&fixture::mod_bytes(), whole_song());
        assert_eq!(
            lines[0],
            "ORD=000 ROW=00 TIC=00 BPM=125 SPD=06  \
             CH00:per=0428 vol=32 smp=01 pan=064 fx=C20  \
             CH01:per=0000 vol=00 smp=00 pan=192 fx=---  \
             CH02:per=0000 vol=00 smp=00 pan=192 fx=---  \
             CH03:per=0000 vol=00 smp=00 pan=064 fx=---"
        );
    }

    #[test]
    fn test_one_line_per_tick() {
        let (lines, count) = dump(&fixture::mod_bytes(), whole_song());
        // Two patterns of 64 rows at speed 6
        assert_eq!(count, 2 * 64 * 6);
        assert_eq!(lines.len(), count);
        assert!(lines[1].starts_with("ORD=000 ROW=00 TIC=01"));
        assert!(lines[6].starts_with("ORD=000 ROW=01 TIC=00"));
        assert!(lines[6].contains("CH01:per=0214 vol=64 smp=01 pan=192 fx=---"));
        assert!(lines.last().unwrap().starts_with("ORD=001 ROW=63 TIC=05"));
    }

    #[test]
    fn test_window_limits_output() {
        let window = Window {
            start: (0, 62),
            end: (1, 1),
        };
        let (lines, count) = dump(&fixture::mod_bytes(), window);
        // Rows 0:62, 0:63, 1:0 and 1:1
        assert_eq!(count, 4 * 6);
        assert!(lines[0].starts_with("ORD=000 ROW=62 TIC=00"));
        assert!(lines[count - 1].starts_with("ORD=001 ROW=01 TIC=05"));
    }

    #[test]
    fn test_stops_when_song_loops() {
        let (lines, count) = dump(&fixture::looping_mod_bytes(), whole_song());
        // Order 1 row 3 jumps straight back to the start
        assert_eq!(count, (64 + 3) * 6);
        assert!(lines.last().unwrap().starts_with("ORD=001 ROW=02 TIC=05"));
    }

    #[test]
    fn test_state_includes_modulation() {
        let mut sequencer = Sequencer::new(module(&fixture::mod_bytes()), DEFAULT_SAMPLE_RATE);
        sequencer.channels_mut()[0].vibrato.offset = -20;
        sequencer.channels_mut()[0].tremolo.offset = 40;
        sequencer.channels_mut()[1].vibrato.offset = 12;

        let line = format_state(&sequencer);
        assert!(line.contains("CH00:per=0408 vol=64"));
        // A channel without a note shows no period even with an offset
        assert!(line.contains("CH01:per=0000 vol=00"));
    }

    #[test]
    fn test_window_from_args() {
        let args = StateArgs {
            file: PathBuf::from("song.mod"),
            start_order: 2,
            start_row: 4,
            end_order: Some(3),
            end_row: None,
        };
        let window = Window::from(&args);
        assert_eq!(window.start, (2, 4));
        assert_eq!(window.end, (3, u16::MAX));
    }
}
