use tracing::debug;

use crate::error::Result;
use crate::sequence::plan::LoopPlan;
use crate::video::{Direction, MediaClip};

/// One repetition of the base window
#[derive(Debug, Clone)]
pub struct LoopSegment {
    /// Position in the loop, starting at 0
    pub index: usize,

    /// Forward or reversed view of the base window
    pub clip: MediaClip,

    /// Seconds this segment overlaps the tail of the previous one
    pub crossfade_in: f64,

    /// True when `clip` is the reversed view of the base window
    pub reversed: bool,
}

impl LoopSegment {
    pub fn duration(&self) -> f64 {
        self.clip.duration()
    }
}

/// Expands a base clip into the ordered list of repetitions
#[derive(Debug, Clone)]
pub struct LoopSequenceBuilder {
    plan: LoopPlan,
}

impl LoopSequenceBuilder {
    pub fn new(plan: LoopPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &LoopPlan {
        &self.plan
    }

    /// Build `loop_count` segments from `base`.
    ///
    /// Segment 0 never fades in; every later segment fades in over
    /// `transition` seconds. With reversal on, odd indices use the reversed
    /// view of the whole window, derived once and shared.
    pub fn build(&self, base: &MediaClip) -> Result<Vec<LoopSegment>> {
        self.plan.check_window(base.duration())?;

        let reversed_view = self.plan.reverse().then(|| base.reversed());

        let segments: Vec<LoopSegment> = (0..self.plan.loop_count() as usize)
            .map(|index| {
                let direction = Direction::for_index(index, self.plan.reverse());
                let clip = match (direction, &reversed_view) {
                    (Direction::Reversed, Some(reversed)) => reversed.clone(),
                    _ => base.clone(),
                };
                let crossfade_in = if index == 0 { 0.0 } else { self.plan.transition() };

                LoopSegment {
                    index,
                    clip,
                    crossfade_in,
                    reversed: direction.is_reversed(),
                }
            })
            .collect();

        debug!(
            "Built {} loop segments ({} reversed, {:.3}s crossfade)",
            segments.len(),
            segments.iter().filter(|s| s.reversed).count(),
            self.plan.transition()
        );

        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeamloopError;
    use crate::video::types::tests::test_clip;

    fn window(duration: f64) -> MediaClip {
        test_clip(10.0).subclip(0.0, duration)
    }

    #[test]
    fn test_three_forward_segments() {
        let plan = LoopPlan::new(3, 1.0, false).unwrap();
        let segments = LoopSequenceBuilder::new(plan).build(&window(4.0)).unwrap();

        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| !s.reversed && !s.clip.is_reversed()));
        assert!(segments.iter().all(|s| s.duration() == 4.0));

        let fades: Vec<f64> = segments.iter().map(|s| s.crossfade_in).collect();
        assert_eq!(fades, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_ping_pong_alternates_starting_forward() {
        let plan = LoopPlan::new(4, 0.5, true).unwrap();
        let base = window(4.0);
        let segments = LoopSequenceBuilder::new(plan).build(&base).unwrap();

        let reversed: Vec<bool> = segments.iter().map(|s| s.reversed).collect();
        assert_eq!(reversed, vec![false, true, false, true]);

        for segment in &segments {
            assert_eq!(segment.clip.is_reversed(), segment.reversed);
            // Full window reversed, not a part of it
            assert!(segment.clip.same_window(&base));
        }
    }

    #[test]
    fn test_single_segment_has_no_transition() {
        let plan = LoopPlan::new(1, 0.5, true).unwrap();
        let segments = LoopSequenceBuilder::new(plan).build(&window(4.0)).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].crossfade_in, 0.0);
        assert!(!segments[0].reversed);
    }

    #[test]
    fn test_transition_not_shorter_than_window_is_rejected() {
        let plan = LoopPlan::new(3, 4.0, false).unwrap();
        let err = LoopSequenceBuilder::new(plan).build(&window(4.0)).unwrap_err();
        assert!(matches!(err, SeamloopError::InvalidLoopPlan { .. }));

        let plan = LoopPlan::new(3, 5.0, false).unwrap();
        assert!(LoopSequenceBuilder::new(plan).build(&window(4.0)).is_err());
    }

    #[test]
    fn test_indices_are_sequential() {
        let plan = LoopPlan::new(5, 0.2, true).unwrap();
        let segments = LoopSequenceBuilder::new(plan).build(&window(2.0)).unwrap();
        let indices: Vec<usize> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
