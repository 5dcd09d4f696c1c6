//! Channel mixing
//!
//! The [`Mixer`] trait turns channel registers into stereo output. The
//! bundled [`LinearMixer`] resamples with linear interpolation at Amiga
//! Paula rates.

use nether_tracker::{SampleData, SampleLoop, TrackerModule};

use crate::channels::ChannelState;

/// PAL Amiga clock in Hz; one period unit is two clock cycles
pub const PAULA_CLOCK_HZ: f64 = 7_093_789.2;

/// Resamples and sums channels into stereo buffers
pub trait Mixer {
    /// Output sample rate
    fn sample_rate(&self) -> u32;

    /// Convert the module's sample data into the mixer's working format.
    /// Called once before rendering.
    fn prepare(&mut self, module: &TrackerModule);

    /// Overwrite `left` and `right` with the mix of `channels`.
    ///
    /// Sample positions and the `playing` flag are written back to the
    /// channels. When `capture` holds one buffer per channel, each receives
    /// that channel's pre-panning signal (silence when not playing).
    fn render(
        &mut self,
        channels: &mut [ChannelState],
        left: &mut [f32],
        right: &mut [f32],
        capture: Option<&mut [Vec<f32>]>,
    );
}

/// Sample data converted to floats at load time
#[derive(Debug, Clone)]
struct PreparedSample {
    data: Vec<f32>,
    sample_loop: Option<SampleLoop>,
}

impl PreparedSample {
    fn new(data: &SampleData, sample_loop: Option<SampleLoop>) -> Self {
        let data = match data {
            SampleData::I8(pcm) => pcm.iter().map(|&s| s as f32 / 128.0).collect(),
            SampleData::I16(pcm) => pcm.iter().map(|&s| s as f32 / 32768.0).collect(),
        };
        // A zero-length loop cannot be wrapped into
        let sample_loop = sample_loop.filter(|l| l.length > 0);
        Self { data, sample_loop }
    }
}

/// Linear-interpolating mixer
#[derive(Debug, Clone)]
pub struct LinearMixer {
    sample_rate: u32,
    /// Indexed by `[instrument][sample]`
    samples: Vec<Vec<PreparedSample>>,
}

impl LinearMixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples: Vec::new(),
        }
    }
}

impl Default for LinearMixer {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SAMPLE_RATE)
    }
}

impl Mixer for LinearMixer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn prepare(&mut self, module: &TrackerModule) {
        self.samples = module
            .instruments
            .iter()
            .map(|instrument| {
                instrument
                    .samples
                    .iter()
                    .map(|sample| PreparedSample::new(&sample.data, sample.sample_loop))
                    .collect()
            })
            .collect();
    }

    fn render(
        &mut self,
        channels: &mut [ChannelState],
        left: &mut [f32],
        right: &mut [f32],
        mut capture: Option<&mut [Vec<f32>]>,
    ) {
        let frames = left.len().min(right.len());
        left.fill(0.0);
        right.fill(0.0);
        if let Some(capture) = capture.as_deref_mut() {
            for buffer in capture.iter_mut() {
                buffer.fill(0.0);
            }
        }

        for (ch, channel) in channels.iter_mut().enumerate() {
            if !channel.playing || channel.period <= 0 {
                continue;
            }
            let Some(prepared) = self
                .samples
                .get(channel.instrument_index)
                .and_then(|inst| inst.get(channel.sample_index))
            else {
                continue;
            };
            if prepared.data.is_empty() {
                continue;
            }

            let effective_period = channel.effective_period() as f64;
            let frequency = PAULA_CLOCK_HZ / (effective_period * 2.0);
            let step = frequency / self.sample_rate as f64;

            let volume = channel.effective_volume() as f32 / 64.0;
            let pan = channel.panning as f32 / 255.0;
            let gains = Gains {
                volume,
                left: volume * (1.0 - pan) * 2.0,
                right: volume * pan * 2.0,
            };

            let capture_buffer = capture
                .as_deref_mut()
                .and_then(|buffers| buffers.get_mut(ch))
                .map(Vec::as_mut_slice);

            render_channel(
                prepared,
                step,
                gains,
                channel,
                &mut left[..frames],
                &mut right[..frames],
                capture_buffer,
            );
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Gains {
    volume: f32,
    left: f32,
    right: f32,
}

/// Wrap `pos` into `[start, start + length)`, any overshoot in one step
#[inline]
fn wrap_into_loop(pos: f64, sample_loop: &SampleLoop) -> f64 {
    let start = sample_loop.start as f64;
    let length = sample_loop.length as f64;
    if pos < start + length {
        return pos;
    }
    let wrapped = pos - length * ((pos - start) / length).floor();
    if wrapped >= start + length { start } else { wrapped }
}

fn render_channel(
    prepared: &PreparedSample,
    step: f64,
    gains: Gains,
    channel: &mut ChannelState,
    left: &mut [f32],
    right: &mut [f32],
    mut capture: Option<&mut [f32]>,
) {
    let data = &prepared.data;
    let len = data.len() as f64;
    let mut pos = channel.position;

    for frame in 0..left.len() {
        match &prepared.sample_loop {
            Some(sample_loop) => pos = wrap_into_loop(pos, sample_loop),
            None if pos >= len => {
                channel.playing = false;
                break;
            }
            None => {}
        }

        let index = pos as usize;
        let Some(&s0) = data.get(index) else {
            channel.playing = false;
            break;
        };
        let next = match &prepared.sample_loop {
            Some(l) if index + 1 >= l.end() as usize => {
                l.start as usize + (index + 1 - l.end() as usize)
            }
            _ => index + 1,
        };
        let s1 = data.get(next).copied().unwrap_or(s0);

        let frac = (pos - index as f64) as f32;
        let value = s0 + (s1 - s0) * frac;

        left[frame] += value * gains.left;
        right[frame] += value * gains.right;
        if let Some(buffer) = capture.as_deref_mut()
            && let Some(slot) = buffer.get_mut(frame)
        {
            *slot = value * gains.volume;
        }

        pos += step;
    }

    if let Some(sample_loop) = &prepared.sample_loop {
        pos = wrap_into_loop(pos, sample_loop);
    }
    channel.position = pos;
}
