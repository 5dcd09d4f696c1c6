//! Render command - offline render to a 16-bit stereo WAV

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use hashbrown::HashSet;
use hound::{SampleFormat, WavSpec, WavWriter};
use nether_player::{DEFAULT_SAMPLE_RATE, Renderer};
use nether_tracker::TrackerModule;
use tracing::{debug, info};

use crate::load::load_module;

/// Arguments for the render command
#[derive(Args)]
pub struct RenderArgs {
    /// Path to the MOD file
    pub input: PathBuf,

    /// Output WAV path (defaults to the input path with a .wav extension)
    pub output: Option<PathBuf>,

    /// Extra passes to play when the song loops back on itself
    #[arg(long, default_value_t = 0)]
    pub loops: u32,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,
}

/// What a render produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Stereo frames written
    pub frames: usize,
    /// Times playback came back to an already rendered position
    pub loops: u32,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    if args.sample_rate == 0 {
        bail!("--sample-rate must be greater than zero");
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("wav"));
    if output == args.input {
        bail!("Output {} would overwrite the input", output.display());
    }

    let loaded = load_module(&args.input)?;
    let module = loaded.module;
    let title = if module.title.is_empty() {
        args.input.display().to_string()
    } else {
        module.title.clone()
    };
    info!(
        title = %title,
        channels = module.num_channels,
        patterns = module.patterns.len(),
        orders = module.order_table.len(),
        "Rendering"
    );

    let stats = render_to_wav(Arc::new(module), &output, args.sample_rate, args.loops)?;
    let seconds = stats.frames as f64 / args.sample_rate as f64;
    info!(
        path = %output.display(),
        frames = stats.frames,
        seconds = %format!("{seconds:.1}"),
        "Wrote WAV"
    );
    Ok(())
}

/// Convert a mixed sample to 16-bit PCM, clipping out-of-range values
fn to_pcm(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Render `module` tick by tick into a WAV file at `path`.
///
/// Rendering ends when the song finishes or, after `loops` extra passes,
/// when playback returns to an order/row it already rendered.
pub fn render_to_wav(
    module: Arc<TrackerModule>,
    path: &Path,
    sample_rate: u32,
    loops: u32,
) -> Result<RenderStats> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let song_length = module.song_length();
    let mut renderer = Renderer::from_module(module, sample_rate);
    let mut left = Vec::new();
    let mut right = Vec::new();

    let mut visited = HashSet::new();
    visited.insert((0u16, 0u16));
    let mut previous = (0, 0);
    let mut remaining_loops = loops;
    let mut last_reported = None;
    let mut stats = RenderStats {
        frames: 0,
        loops: 0,
    };

    while !renderer.is_finished() {
        // One tick per pass so position checks land on tick boundaries
        let frames = renderer.source().samples_per_tick() as usize;
        left.resize(frames, 0.0);
        right.resize(frames, 0.0);
        renderer.render(&mut left, &mut right);

        for (&l, &r) in left.iter().zip(&right) {
            writer.write_sample(to_pcm(l))?;
            writer.write_sample(to_pcm(r))?;
        }
        stats.frames += frames;

        let sequencer = renderer.source();
        let position = (sequencer.order(), sequencer.row());
        if last_reported != Some(position.0) && position.0 < song_length {
            debug!(order = position.0 + 1, of = song_length, "Rendering order");
            last_reported = Some(position.0);
        }

        if position != previous {
            if visited.contains(&position) {
                stats.loops += 1;
                if remaining_loops == 0 {
                    break;
                }
                remaining_loops -= 1;
                visited.clear();
            }
            visited.insert(position);
            previous = position;
        }
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finish {}", path.display()))?;
    Ok(stats)
}
