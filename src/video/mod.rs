//! # Video Module
//!
//! Input-side handling: probing a file for its duration and stream layout,
//! the immutable clip views the rest of the pipeline passes around, and
//! trimming a working window out of the source.

pub mod prober;
pub mod trimmer;
pub mod types;

pub use prober::{DurationEstimator, DurationProber, FfprobeProber, ProbeReport};
pub use trimmer::{TrimOutcome, Trimmer};
pub use types::{Direction, MediaClip, MediaSource};
