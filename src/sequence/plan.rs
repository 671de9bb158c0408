use crate::error::{Result, SeamloopError};

/// Smallest accepted repeat count
pub const MIN_LOOP_COUNT: u32 = 1;

/// Largest accepted repeat count
pub const MAX_LOOP_COUNT: u32 = 10;

/// Validated loop parameters
///
/// Construction checks everything that can be checked without knowing the
/// trimmed window; [`LoopPlan::check_window`] covers the rest once the window
/// length is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPlan {
    loop_count: u32,
    transition: f64,
    reverse: bool,
}

impl LoopPlan {
    pub fn new(loop_count: u32, transition: f64, reverse: bool) -> Result<Self> {
        if !(MIN_LOOP_COUNT..=MAX_LOOP_COUNT).contains(&loop_count) {
            return Err(SeamloopError::invalid_plan(format!(
                "loop count {} is outside {}..={}",
                loop_count, MIN_LOOP_COUNT, MAX_LOOP_COUNT
            )));
        }

        if !transition.is_finite() || transition <= 0.0 {
            return Err(SeamloopError::invalid_plan(format!(
                "transition duration must be a positive number of seconds, got {}",
                transition
            )));
        }

        Ok(Self {
            loop_count,
            transition,
            reverse,
        })
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Crossfade length in seconds
    pub fn transition(&self) -> f64 {
        self.transition
    }

    /// Whether odd repetitions play backwards
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Reject a transition that is not strictly shorter than the window.
    ///
    /// A full-window crossfade leaves no content outside the overlap, so this
    /// is never clamped.
    pub fn check_window(&self, window: f64) -> Result<()> {
        if self.transition >= window {
            return Err(SeamloopError::invalid_plan(format!(
                "transition {:.3}s must be shorter than the {:.3}s window",
                self.transition, window
            )));
        }
        Ok(())
    }

    /// Length of the finished loop for a window of `window` seconds
    pub fn output_duration(&self, window: f64) -> f64 {
        let n = self.loop_count as f64;
        n * window - (n - 1.0) * self.transition
    }
}
