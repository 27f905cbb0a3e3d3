//! MultiTrack — channels pulled in lock-step.

use crate::error::RenderError;
use crate::wav::sample_to_int;

use super::frozen::FrozenTrack;
use super::mono::MonoTrack;

/// One channel of a multi-channel track.
pub enum Lane {
    /// A live composition tree.
    Live(MonoTrack),
    /// A frozen buffer with its own playback position.
    Frozen { track: FrozenTrack, pos: usize },
}

impl Lane {
    fn sample_rate(&self) -> u32 {
        match self {
            Lane::Live(track) => track.sample_rate(),
            Lane::Frozen { track, .. } => track.sample_rate(),
        }
    }

    fn pull(&mut self) -> Result<Option<f64>, RenderError> {
        match self {
            Lane::Live(track) => track.pull(),
            Lane::Frozen { track, pos } => {
                let sample = track.samples().get(*pos).copied();
                if sample.is_some() {
                    *pos += 1;
                }
                Ok(sample)
            }
        }
    }
}

impl From<MonoTrack> for Lane {
    fn from(track: MonoTrack) -> Self {
        Lane::Live(track)
    }
}

impl From<FrozenTrack> for Lane {
    fn from(track: FrozenTrack) -> Self {
        Lane::Frozen { track, pos: 0 }
    }
}

/// A fixed set of channels consumed one frame at a time.
///
/// The track ends as soon as *any* lane ends; lanes of differing length must
/// be padded beforehand.
pub struct MultiTrack {
    lanes: Vec<Lane>,
    sample_rate: u32,
}

impl MultiTrack {
    /// Build from at least one lane. All lanes must share a sample rate.
    pub fn new(lanes: Vec<Lane>) -> Result<Self, RenderError> {
        let Some(first) = lanes.first() else {
            return Err(RenderError::BadChannels {
                detail: "multi-channel track needs at least one lane".into(),
            });
        };
        let sample_rate = first.sample_rate();
        if let Some(other) = lanes.iter().map(Lane::sample_rate).find(|&r| r != sample_rate) {
            return Err(RenderError::BadChannels {
                detail: format!("mixed lane sample rates: {sample_rate} vs {other}"),
            });
        }
        Ok(MultiTrack { lanes, sample_rate })
    }

    /// Duplicate one mono track across `n` channels.
    ///
    /// The track is frozen first so every channel replays the same data
    /// instead of fighting over one stateful tree.
    pub fn from_mono(track: MonoTrack, n: usize) -> Result<Self, RenderError> {
        if n == 0 {
            return Err(RenderError::BadChannels {
                detail: "channel count must be at least 1".into(),
            });
        }
        let frozen = FrozenTrack::capture(track, None)?;
        let lanes = (0..n).map(|_| Lane::from(frozen.clone())).collect();
        Self::new(lanes)
    }

    pub fn channels(&self) -> usize {
        self.lanes.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Pull one frame: one sample per channel.
    ///
    /// Every lane is pulled even on the terminating tick, so lane state stays
    /// in step; the values of that final partial frame are discarded.
    pub fn pull_frame(&mut self) -> Result<Option<Vec<f64>>, RenderError> {
        let mut frame = Vec::with_capacity(self.lanes.len());
        let mut done = false;
        for lane in &mut self.lanes {
            match lane.pull()? {
                Some(sample) => frame.push(sample),
                None => done = true,
            }
        }
        if done { Ok(None) } else { Ok(Some(frame)) }
    }

    /// Drain into interleaved 16-bit PCM, one i16 per channel per frame.
    pub fn render_blocks(&mut self, max_frames: Option<usize>) -> Result<Vec<i16>, RenderError> {
        let mut out = Vec::new();
        let mut frames = 0usize;
        while max_frames.is_none_or(|max| frames < max) {
            match self.pull_frame()? {
                Some(frame) => {
                    out.extend(frame.into_iter().map(sample_to_int));
                    frames += 1;
                }
                None => break,
            }
        }
        Ok(out)
    }
}
