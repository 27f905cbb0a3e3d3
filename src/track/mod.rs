//! Lazy sample-stream composition engine.
//!
//! Tracks are trees of pull-based nodes: leaves produce samples (oscillators,
//! literal buffers, decoded audio) and inner nodes sequence, mix and scale
//! them. Nothing is materialized until a track is rendered or frozen.

pub mod frozen;
pub mod mono;
pub mod multi;
pub mod node;
pub mod source;

pub use frozen::FrozenTrack;
pub use mono::MonoTrack;
pub use multi::{Lane, MultiTrack};
pub use node::Node;
pub use source::SampleSource;
