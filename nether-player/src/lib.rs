//! Nether-Player: tick-accurate playback of tracker modules
//!
//! Turns an immutable [`TrackerModule`](nether_tracker::TrackerModule) into
//! stereo PCM.
//!
//! # Architecture
//!
//! - **Sequencer** - owns the song position and one [`ChannelState`] per
//!   channel; advances one tick at a time, writing channel registers
//! - **LiveSequencer** - free-running variant driven by note events instead
//!   of pattern data
//! - **Mixer** - resamples prepared sample data according to the channel
//!   registers ([`LinearMixer`])
//! - **Renderer** - slices arbitrary output requests at tick boundaries
//! - **TripleBuffer** - lock-free latest-value handoff for visualization data
//!
//! # Threading
//!
//! One real-time thread owns the [`Renderer`] and calls
//! [`Renderer::render`]. Steady-state rendering does not allocate. Control
//! threads reach the live sequencer through a cloneable [`LiveInput`], and
//! display threads read audio through a [`VisualizationReader`].

mod channels;
mod live;
mod mixer;
mod render;
mod sequencer;
mod triple_buffer;
mod utils;
mod visualization;

pub use channels::{ChannelState, Oscillator};
pub use live::{LiveInput, LiveSequencer, NoteEvent, ReleaseEvent};
pub use mixer::{LinearMixer, Mixer, PAULA_CLOCK_HZ};
pub use render::{Renderer, TickSource};
pub use sequencer::{RowCallback, Sequencer};
pub use triple_buffer::{TripleReader, TripleWriter, triple_buffer};
pub use utils::{
    SINE_TABLE, clamp_volume, period_for_semitone_offset, samples_per_tick, waveform_amplitude,
};
pub use visualization::{
    DEFAULT_VISUALIZATION_LENGTH, VisualizationReader, VisualizationWriter, visualization_buffers,
};

/// Default output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Largest slice the renderer hands to the mixer in one call
pub const SCRATCH_FRAMES: usize = 4096;
