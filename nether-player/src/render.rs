//! Tick/frame renderer
//!
//! Cuts each output request into slices that end exactly on tick
//! boundaries, so effects only ever change between slices.

use std::sync::Arc;

use nether_tracker::TrackerModule;

use crate::SCRATCH_FRAMES;
use crate::channels::ChannelState;
use crate::mixer::{LinearMixer, Mixer};
use crate::sequencer::{RowCallback, Sequencer};
use crate::visualization::VisualizationWriter;

/// Something that advances channel registers one tick at a time
pub trait TickSource {
    /// Module the channels play from
    fn module(&self) -> &Arc<TrackerModule>;

    /// Run one tick of effect processing
    fn advance_tick(&mut self);

    /// Output frames until the next tick at the current tempo
    fn samples_per_tick(&self) -> u32;

    /// No further ticks will produce sound
    fn is_finished(&self) -> bool;

    fn channels_mut(&mut self) -> &mut [ChannelState];
}

impl TickSource for Sequencer {
    fn module(&self) -> &Arc<TrackerModule> {
        Sequencer::module(self)
    }

    fn advance_tick(&mut self) {
        Sequencer::advance_tick(self);
    }

    fn samples_per_tick(&self) -> u32 {
        Sequencer::samples_per_tick(self)
    }

    fn is_finished(&self) -> bool {
        Sequencer::is_finished(self)
    }

    fn channels_mut(&mut self) -> &mut [ChannelState] {
        Sequencer::channels_mut(self)
    }
}

/// Drives a [`TickSource`] and a [`Mixer`] in lockstep
pub struct Renderer<S: TickSource, M: Mixer = LinearMixer> {
    source: S,
    mixer: M,
    /// Frames rendered since the last tick
    sample_counter: u32,
    /// Per-channel pre-pan capture, one scratch slice each
    channel_scratch: Vec<Vec<f32>>,
    visualization: Option<VisualizationWriter>,
}

impl Renderer<Sequencer, LinearMixer> {
    /// Song playback with the default mixer
    pub fn from_module(module: Arc<TrackerModule>, sample_rate: u32) -> Self {
        Self::new(
            Sequencer::new(module, sample_rate),
            LinearMixer::new(sample_rate),
        )
    }
}

impl<S: TickSource, M: Mixer> Renderer<S, M> {
    /// Prepare `mixer` for the source's module and allocate working buffers
    pub fn new(source: S, mut mixer: M) -> Self {
        let module = Arc::clone(source.module());
        mixer.prepare(&module);

        let channel_scratch = (0..module.num_channels)
            .map(|_| vec![0.0; SCRATCH_FRAMES])
            .collect();

        Self {
            source,
            mixer,
            sample_counter: 0,
            channel_scratch,
            visualization: None,
        }
    }

    /// Attach or detach the visualization taps
    pub fn set_visualization(&mut self, writer: Option<VisualizationWriter>) {
        self.visualization = writer;
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn is_finished(&self) -> bool {
        self.source.is_finished()
    }

    /// Fill `left` and `right` with the next frames.
    ///
    /// Frames past the end of the song are silence. Does not allocate.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let mut done = 0;

        while done < frames && !self.source.is_finished() {
            let samples_per_tick = self.source.samples_per_tick();
            let until_tick = samples_per_tick.saturating_sub(self.sample_counter) as usize;
            let n = until_tick.min(frames - done).min(SCRATCH_FRAMES);

            if n > 0 {
                let range = done..done + n;
                let capture = self
                    .visualization
                    .is_some()
                    .then_some(self.channel_scratch.as_mut_slice());

                self.mixer.render(
                    self.source.channels_mut(),
                    &mut left[range.clone()],
                    &mut right[range.clone()],
                    capture,
                );

                if let Some(visualization) = self.visualization.as_mut() {
                    for (ch, scratch) in self.channel_scratch.iter().enumerate() {
                        visualization.push_channel(ch, &scratch[..n]);
                    }
                    visualization.push_stereo(&left[range.clone()], &right[range]);
                }

                done += n;
                self.sample_counter += n as u32;
            }

            if self.sample_counter >= samples_per_tick {
                self.sample_counter = 0;
                self.source.advance_tick();
            }
        }

        left[done..frames].fill(0.0);
        right[done..frames].fill(0.0);
    }
}

impl<M: Mixer> Renderer<Sequencer, M> {
    /// Jump to `order`/`row` and restart the tick clock
    pub fn seek(&mut self, order: u16, row: u16) {
        self.source.seek(order, row);
        self.sample_counter = 0;
    }

    pub fn set_on_row(&mut self, callback: Option<RowCallback>) {
        self.source.set_on_row(callback);
    }
}
