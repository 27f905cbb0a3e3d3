//! Sample sources — the leaves of a composition tree.

use crate::wav::int_to_sample;

/// A lazy producer of samples in [-1, 1].
///
/// Exhaustion is sticky: once `pull` returns `None` it returns `None` on
/// every later call. Generators are boxed as fused iterators so that re-pull
/// after end of stream can never resurrect a source.
pub enum SampleSource {
    /// A finite buffer played front to back (literal data, decoded audio).
    Samples { data: Vec<f64>, pos: usize },
    /// A generator iterator (oscillators and friends).
    Iter(Box<dyn Iterator<Item = f64>>),
}

impl SampleSource {
    /// Source over an owned buffer of samples.
    pub fn from_samples(data: Vec<f64>) -> Self {
        SampleSource::Samples { data, pos: 0 }
    }

    /// Source over any sample iterator.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = f64> + 'static,
    {
        SampleSource::Iter(Box::new(iter.fuse()))
    }

    /// Source over one channel of interleaved PCM blocks, as produced by the
    /// WAV decoder. `channel` indexes into each frame of `channel_count`
    /// samples.
    pub fn from_blocks(blocks: &[i16], channel: usize, channel_count: usize) -> Self {
        assert!(channel < channel_count, "channel out of range");
        let data = blocks
            .chunks_exact(channel_count)
            .map(|frame| int_to_sample(frame[channel]))
            .collect();
        SampleSource::Samples { data, pos: 0 }
    }

    /// Produce the next sample, or `None` once the source is exhausted.
    pub fn pull(&mut self) -> Option<f64> {
        match self {
            SampleSource::Samples { data, pos } => {
                let sample = data.get(*pos).copied()?;
                *pos += 1;
                Some(sample)
            }
            SampleSource::Iter(iter) => iter.next(),
        }
    }
}
