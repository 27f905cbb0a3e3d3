//! FrozenTrack — an eagerly captured, replayable sample buffer.

use crate::error::RenderError;

use super::mono::MonoTrack;

/// A fully materialized track.
///
/// Unlike a live [`MonoTrack`], a frozen track can be inspected and replayed
/// any number of times — the backing for spectrum analysis and for snippets
/// used in several places.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenTrack {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl FrozenTrack {
    pub fn from_samples(samples: Vec<f64>, sample_rate: u32) -> Self {
        FrozenTrack {
            samples,
            sample_rate,
        }
    }

    /// Fully drain `track` into an owned buffer.
    ///
    /// With `max_samples` set this is a hard cap: a track still producing
    /// when the cap is reached is an error, not a silent truncation.
    pub fn capture(mut track: MonoTrack, max_samples: Option<usize>) -> Result<Self, RenderError> {
        let sample_rate = track.sample_rate();
        let mut samples = Vec::new();
        loop {
            if let Some(limit) = max_samples
                && samples.len() >= limit
            {
                return match track.pull()? {
                    None => Ok(FrozenTrack {
                        samples,
                        sample_rate,
                    }),
                    Some(_) => Err(RenderError::CaptureOverflow { limit }),
                };
            }
            match track.pull()? {
                Some(sample) => samples.push(sample),
                None => {
                    return Ok(FrozenTrack {
                        samples,
                        sample_rate,
                    });
                }
            }
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// A fresh live track playing this buffer from the start.
    pub fn to_track(&self) -> MonoTrack {
        MonoTrack::from_samples(self.samples.clone(), self.sample_rate)
    }
}
