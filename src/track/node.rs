//! Composition nodes — the pull protocol.
//!
//! A `Node` is a strict tree: every child is exclusively owned by exactly one
//! parent, so pruning a finished branch never disturbs a sibling. All state
//! (queue position, live voices, elapsed ticks) lives in the variant fields.

use std::collections::VecDeque;

use crate::error::RenderError;

use super::source::SampleSource;

/// Clamp a sample into the legal [-1, 1] interval.
pub(crate) fn clamp_sample(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// One node of a composition tree.
pub enum Node {
    /// Leaf: a raw sample source.
    Source(SampleSource),
    /// Children play back to back in insertion order.
    Sequence { queue: VecDeque<Node> },
    /// Children play simultaneously; output is their sum.
    Mix { voices: Vec<Node> },
    /// Constant amplitude scaling, clamped to [-1, 1].
    Scale { child: Box<Node>, factor: f64 },
    /// Time-varying amplitude scaling. `ticks` advances exactly once per
    /// pull; the factor function sees `ticks / sample_rate` seconds.
    ScaleFn {
        child: Box<Node>,
        factor_fn: Box<dyn Fn(f64) -> f64>,
        sample_rate: u32,
        ticks: u64,
    },
}

impl Node {
    /// An empty sequence — produces nothing, the identity for `then`.
    pub fn empty() -> Self {
        Node::Sequence {
            queue: VecDeque::new(),
        }
    }

    /// Node kind name, used in fault reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Source(_) => "source",
            Node::Sequence { .. } => "sequence",
            Node::Mix { .. } => "mix",
            Node::Scale { .. } => "scale",
            Node::ScaleFn { .. } => "scale_fn",
        }
    }

    /// Produce the next sample of this subtree.
    ///
    /// `Ok(None)` signals exhaustion and is sticky for every variant. Faults
    /// from user factor functions are never swallowed; only exhaustion of a
    /// child is intercepted (to splice or prune).
    pub fn pull(&mut self) -> Result<Option<f64>, RenderError> {
        match self {
            Node::Source(src) => Ok(src.pull()),

            Node::Sequence { queue } => {
                // Drop finished children and retry within the same call, so a
                // splice never costs an output tick.
                loop {
                    let Some(current) = queue.front_mut() else {
                        return Ok(None);
                    };
                    match current.pull()? {
                        Some(sample) => return Ok(Some(sample)),
                        None => {
                            queue.pop_front();
                        }
                    }
                }
            }

            Node::Mix { voices } => {
                if voices.is_empty() {
                    return Ok(None);
                }
                // Every live voice is pulled exactly once per tick, with no
                // short-circuiting. A voice that ends this tick contributes 0
                // and is removed after summation, so a short voice never cuts
                // a longer sibling short; the mix itself ends on the first
                // tick where no voice yields a value.
                let mut sum = 0.0;
                let mut yielded = false;
                let mut finished = Vec::new();
                for (i, voice) in voices.iter_mut().enumerate() {
                    match voice.pull()? {
                        Some(sample) => {
                            sum += sample;
                            yielded = true;
                        }
                        None => finished.push(i),
                    }
                }
                for i in finished.into_iter().rev() {
                    voices.remove(i);
                }
                if yielded { Ok(Some(sum)) } else { Ok(None) }
            }

            Node::Scale { child, factor } => match child.pull()? {
                Some(sample) => Ok(Some(clamp_sample(sample * *factor))),
                None => Ok(None),
            },

            Node::ScaleFn {
                child,
                factor_fn,
                sample_rate,
                ticks,
            } => {
                let t = *ticks as f64 / *sample_rate as f64;
                let tick = *ticks;
                // Time only moves forward, even if the child turns out to be
                // exhausted or the factor is bad.
                *ticks += 1;
                let factor = factor_fn(t);
                if !factor.is_finite() {
                    return Err(RenderError::NonFiniteFactor {
                        node: "scale_fn",
                        tick,
                        value: factor,
                    });
                }
                match child.pull()? {
                    Some(sample) => Ok(Some(clamp_sample(sample * factor))),
                    None => Ok(None),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(samples: &[f64]) -> Node {
        Node::Source(SampleSource::from_samples(samples.to_vec()))
    }

    fn drain(node: &mut Node) -> Vec<f64> {
        let mut out = Vec::new();
        while let Some(s) = node.pull().expect("pull failed") {
            out.push(s);
        }
        out
    }

    #[test]
    fn sequence_concatenates_without_gaps() {
        let mut node = Node::Sequence {
            queue: VecDeque::from([src(&[0.1, 0.2, 0.3]), src(&[0.4, 0.5])]),
        };
        assert_eq!(drain(&mut node), vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn sequence_skips_empty_children_in_one_call() {
        let mut node = Node::Sequence {
            queue: VecDeque::from([src(&[]), src(&[]), src(&[0.7])]),
        };
        // The first pull must already reach the third child.
        assert_eq!(node.pull().unwrap(), Some(0.7));
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn empty_sequence_is_exhausted() {
        let mut node = Node::empty();
        assert_eq!(node.pull().unwrap(), None);
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn mix_sums_and_outlives_short_voices() {
        let mut node = Node::Mix {
            voices: vec![src(&[1.0, 1.0]), src(&[0.5])],
        };
        // Tick 1: both voices. Tick 2: short voice ends, contributes 0.
        assert_eq!(node.pull().unwrap(), Some(1.5));
        assert_eq!(node.pull().unwrap(), Some(1.0));
        // Tick 3: the longest voice is done, so the mix is done.
        assert_eq!(node.pull().unwrap(), None);
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn mix_keeps_zero_valued_voices_alive() {
        let mut node = Node::Mix {
            voices: vec![src(&[0.0, 0.0, 0.0])],
        };
        // A valid zero sample is not exhaustion.
        assert_eq!(node.pull().unwrap(), Some(0.0));
        assert_eq!(node.pull().unwrap(), Some(0.0));
        assert_eq!(node.pull().unwrap(), Some(0.0));
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn mix_of_nothing_is_exhausted() {
        let mut node = Node::Mix { voices: vec![] };
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn scale_clamps() {
        let mut node = Node::Scale {
            child: Box::new(src(&[0.6, -0.6, 0.1])),
            factor: 2.0,
        };
        assert_eq!(drain(&mut node), vec![1.0, -1.0, 0.2]);
    }

    #[test]
    fn scale_propagates_exhaustion() {
        let mut node = Node::Scale {
            child: Box::new(src(&[])),
            factor: 0.5,
        };
        assert_eq!(node.pull().unwrap(), None);
    }

    #[test]
    fn scale_fn_evaluates_at_tick_over_rate() {
        let mut node = Node::ScaleFn {
            child: Box::new(src(&[1.0, 1.0, 1.0, 1.0])),
            factor_fn: Box::new(|t| 1.0 - t),
            sample_rate: 4,
            ticks: 0,
        };
        assert_eq!(drain(&mut node), vec![1.0, 0.75, 0.5, 0.25]);
    }

    #[test]
    fn scale_fn_time_advances_past_exhaustion() {
        let mut node = Node::ScaleFn {
            child: Box::new(src(&[1.0])),
            factor_fn: Box::new(|t| t),
            sample_rate: 1,
            ticks: 0,
        };
        assert_eq!(node.pull().unwrap(), Some(0.0));
        assert_eq!(node.pull().unwrap(), None);
        // Ticks kept moving while the child was exhausted.
        match node {
            Node::ScaleFn { ticks, .. } => assert_eq!(ticks, 2),
            _ => unreachable!(),
        }
    }

    #[test]
    fn non_finite_factor_is_fatal_with_position() {
        let mut node = Node::ScaleFn {
            child: Box::new(src(&[1.0, 1.0])),
            factor_fn: Box::new(|t| 1.0 / t),
            sample_rate: 48000,
            ticks: 0,
        };
        let err = node.pull().unwrap_err();
        assert_eq!(
            err,
            RenderError::NonFiniteFactor {
                node: "scale_fn",
                tick: 0,
                value: f64::INFINITY,
            }
        );
    }

    #[test]
    fn mix_does_not_swallow_child_faults() {
        let bad = Node::ScaleFn {
            child: Box::new(src(&[1.0])),
            factor_fn: Box::new(|_| f64::NAN),
            sample_rate: 1,
            ticks: 0,
        };
        let mut node = Node::Mix {
            voices: vec![src(&[0.5]), bad],
        };
        assert!(node.pull().is_err());
    }

    #[test]
    fn nested_tree_pulls_through() {
        // (seq(a, b) mixed with c) scaled by 0.5
        let seq = Node::Sequence {
            queue: VecDeque::from([src(&[0.2]), src(&[0.4])]),
        };
        let mix = Node::Mix {
            voices: vec![seq, src(&[0.6, 0.6])],
        };
        let mut node = Node::Scale {
            child: Box::new(mix),
            factor: 0.5,
        };
        assert_eq!(node.pull().unwrap(), Some(0.4)); // (0.2 + 0.6) / 2
        assert_eq!(node.pull().unwrap(), Some(0.5)); // (0.4 + 0.6) / 2
        assert_eq!(node.pull().unwrap(), None);
    }
}
