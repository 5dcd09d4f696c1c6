//! Info command - header, sample list and load warnings

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;
use nether_tracker::TrackerModule;
use tracing::error;

use crate::load::load_module;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// Module files to summarize
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the info command
pub fn execute(args: InfoArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut failed = 0;
    for path in &args.files {
        let result = load_module(path).and_then(|loaded| {
            write_info(&mut out, &display_name(path), &loaded.module, loaded.file_size)?;
            Ok(())
        });
        if let Err(err) = result {
            error!("{err:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files could not be read", args.files.len());
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Human-readable byte count
pub fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / KB)
    } else {
        format!("{:.1} MB", bytes as f64 / (KB * KB))
    }
}

pub fn write_info(
    out: &mut impl Write,
    name: &str,
    module: &TrackerModule,
    file_size: usize,
) -> io::Result<()> {
    let width = name.chars().count().max(40);
    let bar = "─".repeat(width);
    writeln!(out, "┌─{bar}─┐")?;
    writeln!(out, "│ {name:<width$} │")?;
    writeln!(out, "└─{bar}─┘")?;

    let title = if module.title.is_empty() {
        "(untitled)"
    } else {
        module.title.as_str()
    };
    writeln!(out, "  Title:       {title}")?;
    writeln!(out, "  Format:      {}", module.format_description)?;
    writeln!(out, "  Channels:    {}", module.num_channels)?;
    writeln!(out, "  Patterns:    {}", module.patterns.len())?;
    writeln!(out, "  Orders:      {}", module.order_table.len())?;
    writeln!(
        out,
        "  Speed/Tempo: {}/{}",
        module.initial_speed, module.initial_tempo
    )?;
    writeln!(out, "  File size:   {}", format_bytes(file_size))?;

    let samples: Vec<_> = module
        .instruments
        .iter()
        .enumerate()
        .filter_map(|(i, instrument)| {
            let sample = instrument.samples.first()?;
            (!sample.data.is_empty()).then_some((i, sample))
        })
        .collect();
    writeln!(
        out,
        "  Samples:     {} of {}",
        samples.len(),
        module.instruments.len()
    )?;
    writeln!(out)?;

    for (i, sample) in samples {
        let name = if sample.name.is_empty() {
            "(unnamed)"
        } else {
            sample.name.as_str()
        };
        let finetune = match sample.finetune {
            0 => String::new(),
            ft => format!(" ft:{ft}"),
        };
        let sample_loop = sample
            .sample_loop
            .map(|l| format!("loop {}..+{}", l.start, l.length))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:2}. {name:<22}  {:<10} vol:{:2}{finetune} {sample_loop}",
            i + 1,
            format_bytes(sample.data.frame_count()),
            sample.volume,
        )?;
    }

    if !module.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Warnings:")?;
        for warning in &module.warnings {
            writeln!(out, "    {warning}")?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use nether_tracker::LoadWarning;

    fn render(module: &TrackerModule, file_size: usize) -> String {
        let mut out = Vec::new();
        write_info(&mut out, "fixture.mod", module, file_size).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_summary_lists_only_non_empty_samples() {
        let bytes = fixture::mod_bytes();
        let module = nether_mod::parse_mod(&bytes).unwrap();
        let text = render(&module, bytes.len());

        assert!(text.contains("│ fixture.mod"));
        assert!(text.contains("  Title:       fixture\n"));
        assert!(text.contains("  Channels:    4\n"));
        assert!(text.contains("  Orders:      2\n"));
        assert!(text.contains("  Speed/Tempo: 6/125\n"));
        assert!(text.contains("  Samples:     1 of 31\n"));
        assert!(text.contains("   1. lead"));
        assert!(text.contains("64 B"));
        assert!(text.contains("vol:64 loop 0..+64"));
        assert!(!text.contains("Warnings"));
    }

    #[test]
    fn test_warnings_are_listed() {
        let bytes = fixture::mod_bytes();
        let mut module = nether_mod::parse_mod(&bytes).unwrap();
        module.title.clear();
        module.warnings.push(LoadWarning::LoopExceedsSampleLength {
            sample_index: 0,
            original_start: 10,
            original_length: 100,
            clamped_start: 10,
            clamped_length: 54,
        });

        let text = render(&module, bytes.len());
        assert!(text.contains("(untitled)"));
        assert!(text.contains("  Warnings:\n    Sample 1: loop 10..+100"));
    }
}
