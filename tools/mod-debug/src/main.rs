//! mod-debug - inspection and offline rendering for ProTracker modules
//!
//! # Commands
//!
//! - `mod-debug info` - Summarize header, samples and load warnings
//! - `mod-debug pattern` - Dump pattern cells for a range of orders and rows
//! - `mod-debug state` - Print sequencer registers once per tick
//! - `mod-debug render` - Render the song to a 16-bit stereo WAV
//!
//! # Usage
//!
//! ```bash
//! mod-debug info song.mod other.mod
//! mod-debug pattern song.mod 0:3 0:15
//! mod-debug state song.mod --start-order 2 --end-order 3
//! mod-debug render song.mod --loops 1
//! ```

mod cli;
mod info;
mod load;
mod pattern;
mod render;
mod state;

#[cfg(test)]
mod fixture;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Pattern(args) => pattern::execute(args),
        Commands::State(args) => state::execute(args),
        Commands::Render(args) => render::execute(args),
    }
}
