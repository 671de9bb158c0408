//! # Loop Sequencing
//!
//! Turns a trimmed base clip and a [`LoopPlan`] into the ordered list of
//! repetitions that the compositor lays out on a timeline.

pub mod builder;
pub mod plan;

pub use builder::{LoopSegment, LoopSequenceBuilder};
pub use plan::{LoopPlan, MAX_LOOP_COUNT, MIN_LOOP_COUNT};
