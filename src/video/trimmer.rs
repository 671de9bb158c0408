use tracing::{debug, warn};

use crate::error::{Result, SeamloopError};
use crate::video::types::MediaClip;

/// Result of a trim, including whether the requested end had to be clamped
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub clip: MediaClip,
    pub requested_end: f64,
    pub clamped: bool,
}

impl TrimOutcome {
    /// The end the caller asked for, if it was pulled back to the clip length
    pub fn clamped_from(&self) -> Option<f64> {
        self.clamped.then_some(self.requested_end)
    }
}

/// Cuts a bounded working window out of a clip
#[derive(Debug, Clone)]
pub struct Trimmer {
    min_window: f64,
}

impl Trimmer {
    pub fn new(min_window: f64) -> Self {
        Self { min_window }
    }

    pub fn min_window(&self) -> f64 {
        self.min_window
    }

    /// Extract `[start, end)` from `clip`.
    ///
    /// An `end` past the clip's duration is clamped down to the duration
    /// (the two duration estimates can drift apart, and UI state can go
    /// stale). The clamp is reported through [`TrimOutcome::clamped_from`].
    /// Every other bound violation is an `InvalidTrimWindow` error.
    pub fn trim(&self, clip: &MediaClip, start: f64, end: f64) -> Result<TrimOutcome> {
        let duration = clip.duration();
        let invalid = |end: f64, reason: &str| SeamloopError::InvalidTrimWindow {
            start,
            end,
            duration,
            reason: reason.to_string(),
        };

        if !start.is_finite() || !end.is_finite() {
            return Err(invalid(end, "bounds must be finite numbers"));
        }

        if start < 0.0 {
            return Err(invalid(end, "start must not be negative"));
        }

        let clamped = end > duration;
        let effective_end = if clamped {
            warn!(
                "Trim end {:.3}s is past the {:.3}s source, clamping to {:.3}s",
                end, duration, duration
            );
            duration
        } else {
            end
        };

        if effective_end <= start {
            return Err(invalid(effective_end, "end must be after start"));
        }

        if effective_end - start <= self.min_window {
            return Err(invalid(
                effective_end,
                &format!("window must be longer than {:.3}s", self.min_window),
            ));
        }

        let trimmed = clip.subclip(start, effective_end);
        debug!(
            "Trimmed window [{:.3}, {:.3}) -> {:.3}s, {} frames",
            start,
            effective_end,
            trimmed.duration(),
            trimmed.frame_count()
        );

        Ok(TrimOutcome {
            clip: trimmed,
            requested_end: end,
            clamped,
        })
    }
}

impl Default for Trimmer {
    fn default() -> Self {
        Self::new(0.1)
    }
}
