//! MonoTrack — the user-facing fluent composition handle.

use std::collections::VecDeque;

use crate::error::RenderError;

use super::node::Node;
use super::source::SampleSource;

/// A single-channel track: one composition tree plus a sample rate.
///
/// Every combinator takes the track by value and returns it, so compositions
/// chain: `a.then(b).mix(c).scale(0.5)`. The operand of `then`/`mix` is moved
/// into the tree and cannot be reused afterwards.
pub struct MonoTrack {
    root: Node,
    sample_rate: u32,
}

impl MonoTrack {
    /// An empty track. Sequencing onto it appends; rendering it yields
    /// nothing.
    pub fn new(sample_rate: u32) -> Self {
        MonoTrack {
            root: Node::empty(),
            sample_rate,
        }
    }

    pub fn from_source(source: SampleSource, sample_rate: u32) -> Self {
        MonoTrack {
            root: Node::Source(source),
            sample_rate,
        }
    }

    pub fn from_samples(data: Vec<f64>, sample_rate: u32) -> Self {
        Self::from_source(SampleSource::from_samples(data), sample_rate)
    }

    pub fn from_iter<I>(iter: I, sample_rate: u32) -> Self
    where
        I: Iterator<Item = f64> + 'static,
    {
        Self::from_source(SampleSource::from_iter(iter), sample_rate)
    }

    /// One channel of decoded interleaved PCM blocks.
    pub fn from_blocks(
        blocks: &[i16],
        channel: usize,
        channel_count: usize,
        sample_rate: u32,
    ) -> Self {
        Self::from_source(
            SampleSource::from_blocks(blocks, channel, channel_count),
            sample_rate,
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Play `other` after this track.
    ///
    /// If the root is already a sequence the new part is appended to it
    /// instead of nesting another level.
    pub fn then(mut self, other: MonoTrack) -> Self {
        match &mut self.root {
            Node::Sequence { queue } => queue.push_back(other.root),
            _ => {
                let old = std::mem::replace(&mut self.root, Node::empty());
                self.root = Node::Sequence {
                    queue: VecDeque::from([old, other.root]),
                };
            }
        }
        self
    }

    /// Sequence a generator iterator after this track.
    pub fn then_iter<I>(self, iter: I) -> Self
    where
        I: Iterator<Item = f64> + 'static,
    {
        let rate = self.sample_rate;
        self.then(MonoTrack::from_iter(iter, rate))
    }

    /// Play `other` simultaneously with this track, summing the outputs.
    ///
    /// A mix root collects further `mix` calls as additional voices.
    pub fn mix(mut self, other: MonoTrack) -> Self {
        match &mut self.root {
            Node::Mix { voices } => voices.push(other.root),
            _ => {
                let old = std::mem::replace(&mut self.root, Node::empty());
                self.root = Node::Mix {
                    voices: vec![old, other.root],
                };
            }
        }
        self
    }

    /// Scale the amplitude by a constant, clamping to [-1, 1].
    ///
    /// Repeated calls multiply into one factor: `scale(a).scale(b)` is
    /// `scale(a * b)`.
    pub fn scale(mut self, factor: f64) -> Self {
        match &mut self.root {
            Node::Scale { factor: f, .. } => *f *= factor,
            _ => {
                let old = std::mem::replace(&mut self.root, Node::empty());
                self.root = Node::Scale {
                    child: Box::new(old),
                    factor,
                };
            }
        }
        self
    }

    /// Scale the amplitude by a function of elapsed seconds.
    ///
    /// Always wraps, never merges: stacked calls compose as a product of
    /// functions. Multiply the functions yourself if one envelope is meant.
    pub fn scale_fn<F>(mut self, factor_fn: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        let old = std::mem::replace(&mut self.root, Node::empty());
        self.root = Node::ScaleFn {
            child: Box::new(old),
            factor_fn: Box::new(factor_fn),
            sample_rate: self.sample_rate,
            ticks: 0,
        };
        self
    }

    /// Shape the track with a linear ADSR envelope.
    ///
    /// `attack`, `decay` and `release` are segment lengths in seconds,
    /// `sustain` is the held level, `hit_time` is when the release begins.
    pub fn adsr(self, attack: f64, decay: f64, sustain: f64, release: f64, hit_time: f64) -> Self {
        self.scale_fn(move |t| {
            if t < attack {
                t / attack
            } else if t < attack + decay {
                let x = (t - attack) / decay;
                1.0 - x * (1.0 - sustain)
            } else if t < hit_time {
                sustain
            } else if t < hit_time + release {
                let x = (t - hit_time) / release;
                (1.0 - x) * sustain
            } else {
                0.0
            }
        })
    }

    /// Produce the next sample of the composition.
    pub fn pull(&mut self) -> Result<Option<f64>, RenderError> {
        self.root.pull()
    }

    /// Drain the track into a buffer, stopping at exhaustion or after
    /// `max_samples`, whichever comes first.
    ///
    /// The tree is stateful: rendering twice continues where the first render
    /// stopped. Freeze the track if replays are needed.
    pub fn render(&mut self, max_samples: Option<usize>) -> Result<Vec<f64>, RenderError> {
        let mut out = Vec::new();
        while max_samples.is_none_or(|max| out.len() < max) {
            match self.root.pull()? {
                Some(sample) => out.push(sample),
                None => break,
            }
        }
        Ok(out)
    }
}
