//! CLI command definitions using clap

use std::fmt;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::{info, pattern, render, state};

#[derive(Parser)]
#[command(name = "mod-debug")]
#[command(about = "Inspect, step through and render ProTracker modules")]
#[command(version)]
pub struct Cli {
    /// Show decoder and sequencer debug logs
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize one or more module files
    Info(info::InfoArgs),

    /// Dump pattern cells in playback order
    Pattern(pattern::PatternArgs),

    /// Print channel registers once per tick
    State(state::StateArgs),

    /// Render a module to a WAV file
    Render(render::RenderArgs),
}

/// `START` or `START:END` on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u16,
    pub end: Option<u16>,
}

impl FromStr for Span {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u16>()
                .map_err(|_| format!("'{part}' is not a non-negative number"))
        };

        match s.split_once(':') {
            Some((start, end)) => {
                let span = Span {
                    start: parse(start)?,
                    end: Some(parse(end)?),
                };
                if span.end < Some(span.start) {
                    return Err(format!("range {s} ends before it starts"));
                }
                Ok(span)
            }
            None => Ok(Span {
                start: parse(s)?,
                end: None,
            }),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}:{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}
