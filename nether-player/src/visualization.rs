//! Visualization taps
//!
//! One triple buffer per channel plus left, right and mono mixes. The
//! renderer feeds a [`VisualizationWriter`] on the audio thread; a display
//! thread polls the matching [`VisualizationReader`].

use crate::SCRATCH_FRAMES;
use crate::triple_buffer::{TripleReader, TripleWriter, triple_buffer};

/// Default samples per published block
pub const DEFAULT_VISUALIZATION_LENGTH: usize = 2048;

/// Create a writer/reader pair for `channels` channels, `len` samples per block
pub fn visualization_buffers(
    channels: usize,
    len: usize,
) -> (VisualizationWriter, VisualizationReader) {
    let (channel_writers, channel_readers): (Vec<_>, Vec<_>) =
        (0..channels).map(|_| triple_buffer(len)).unzip();
    let (left_writer, left_reader) = triple_buffer(len);
    let (right_writer, right_reader) = triple_buffer(len);
    let (mono_writer, mono_reader) = triple_buffer(len);

    (
        VisualizationWriter {
            channels: channel_writers,
            left: left_writer,
            right: right_writer,
            mono: mono_writer,
            mono_scratch: vec![0.0; SCRATCH_FRAMES],
        },
        VisualizationReader {
            channels: channel_readers,
            left: left_reader,
            right: right_reader,
            mono: mono_reader,
        },
    )
}

/// Audio-thread half
pub struct VisualizationWriter {
    channels: Vec<TripleWriter>,
    left: TripleWriter,
    right: TripleWriter,
    mono: TripleWriter,
    mono_scratch: Vec<f32>,
}

impl VisualizationWriter {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Append one channel's pre-panning signal. Unknown channels are ignored.
    pub fn push_channel(&mut self, index: usize, samples: &[f32]) {
        if let Some(writer) = self.channels.get_mut(index) {
            writer.append(samples);
        }
    }

    /// Append the stereo mix and its mono downmix `(l + r) / 2`
    pub fn push_stereo(&mut self, left: &[f32], right: &[f32]) {
        self.left.append(left);
        self.right.append(right);

        for (l, r) in left
            .chunks(SCRATCH_FRAMES)
            .zip(right.chunks(SCRATCH_FRAMES))
        {
            let n = l.len().min(r.len());
            let mono = &mut self.mono_scratch[..n];
            for ((m, &l), &r) in mono.iter_mut().zip(l).zip(r) {
                *m = (l + r) * 0.5;
            }
            self.mono.append(mono);
        }
    }
}

/// Display-thread half
pub struct VisualizationReader {
    channels: Vec<TripleReader>,
    left: TripleReader,
    right: TripleReader,
    mono: TripleReader,
}

impl VisualizationReader {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn latest_left(&mut self) -> &[f32] {
        self.left.read_latest()
    }

    pub fn latest_right(&mut self) -> &[f32] {
        self.right.read_latest()
    }

    pub fn latest_mono(&mut self) -> &[f32] {
        self.mono.read_latest()
    }

    pub fn latest_channel(&mut self, index: usize) -> Option<&[f32]> {
        self.channels.get_mut(index).map(TripleReader::read_latest)
    }
}
