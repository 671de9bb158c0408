use std::sync::Arc;

use tracing::debug;

use crate::composition::easing::Easing;
use crate::error::{Result, SeamloopError};
use crate::sequence::LoopSegment;
use crate::video::MediaSource;

/// A segment placed on the output timeline
#[derive(Debug, Clone)]
pub struct Layer {
    pub segment: LoopSegment,

    /// Output time at which the segment starts
    pub start: f64,

    /// Output time at which the segment ends
    pub end: f64,
}

impl Layer {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn fade_in(&self) -> f64 {
        self.segment.crossfade_in
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// The merged loop: ordered layers plus the total output duration
#[derive(Debug, Clone)]
pub struct Timeline {
    layers: Vec<Layer>,
    duration: f64,
    easing: Easing,
}

impl Timeline {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// The input file every layer reads from
    pub fn source(&self) -> &Arc<MediaSource> {
        // compose() never produces an empty timeline
        self.layers[0].segment.clip.source()
    }

    /// `(start, end, fade_in)` for every layer, in order
    pub fn placements(&self) -> Vec<(f64, f64, f64)> {
        self.layers
            .iter()
            .map(|l| (l.start, l.end, l.fade_in()))
            .collect()
    }

    /// Opacity of layer `index` at output time `time`.
    ///
    /// Layers ramp from 0 to 1 across their fade-in and are fully opaque
    /// afterwards. The layer underneath is never faded out.
    pub fn opacity_at(&self, index: usize, time: f64) -> f64 {
        let Some(layer) = self.layers.get(index) else {
            return 0.0;
        };

        if !layer.contains(time) {
            return 0.0;
        }

        let fade = layer.fade_in();
        if fade <= 0.0 {
            return 1.0;
        }

        self.easing.apply((time - layer.start) / fade)
    }

    /// Index of the topmost layer visible at `time`
    pub fn top_layer_at(&self, time: f64) -> Option<usize> {
        self.layers.iter().rposition(|l| l.contains(time))
    }
}

/// Lays loop segments out on one continuous timeline
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    easing: Easing,
}

impl Compositor {
    pub fn new(easing: Easing) -> Self {
        Self { easing }
    }

    /// Place every segment so it overlaps the previous one by its own
    /// `crossfade_in`.
    ///
    /// Overlaps that would swallow a whole segment are rejected here, before
    /// any encode work starts.
    pub fn compose(&self, segments: &[LoopSegment]) -> Result<Timeline> {
        let Some(first) = segments.first() else {
            return Err(SeamloopError::invalid_plan("there are no segments to compose"));
        };

        if first.crossfade_in != 0.0 {
            return Err(SeamloopError::invalid_plan(
                "the first segment has nothing to crossfade from",
            ));
        }

        let mut layers: Vec<Layer> = Vec::with_capacity(segments.len());
        let mut cursor = 0.0;

        for segment in segments {
            let duration = segment.duration();
            let fade = segment.crossfade_in;

            if !fade.is_finite() || fade < 0.0 {
                return Err(SeamloopError::invalid_plan(format!(
                    "segment {} has an invalid crossfade of {}s",
                    segment.index, fade
                )));
            }

            if duration <= fade {
                return Err(SeamloopError::invalid_plan(format!(
                    "segment {} lasts {:.3}s, which does not exceed its {:.3}s crossfade",
                    segment.index, duration, fade
                )));
            }

            if let Some(previous) = layers.last() {
                if fade >= previous.duration() {
                    return Err(SeamloopError::invalid_plan(format!(
                        "segment {} crossfade of {:.3}s covers the whole previous segment",
                        segment.index, fade
                    )));
                }
            }

            let start = cursor - fade;
            let end = start + duration;

            debug!(
                "Layer {}: [{:.3}, {:.3}) fade-in {:.3}s{}",
                segment.index,
                start,
                end,
                fade,
                if segment.reversed { " (reversed)" } else { "" }
            );

            layers.push(Layer {
                segment: segment.clone(),
                start,
                end,
            });
            cursor = end;
        }

        Ok(Timeline {
            layers,
            duration: cursor,
            easing: self.easing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{LoopPlan, LoopSequenceBuilder};
    use crate::video::types::tests::test_clip;

    fn segments(loops: u32, transition: f64, reverse: bool, window: f64) -> Vec<LoopSegment> {
        let base = test_clip(10.0).subclip(0.0, window);
        let plan = LoopPlan::new(loops, transition, reverse).unwrap();
        LoopSequenceBuilder::new(plan).build(&base).unwrap()
    }

    #[test]
    fn test_overlapping_placement() {
        let timeline = Compositor::default().compose(&segments(3, 1.0, false, 4.0)).unwrap();

        assert_eq!(
            timeline.placements(),
            vec![(0.0, 4.0, 0.0), (3.0, 7.0, 1.0), (6.0, 10.0, 1.0)]
        );
        assert_eq!(timeline.duration(), 10.0);
    }

    #[test]
    fn test_duration_formula_holds() {
        for loops in 1..=10u32 {
            for &(window, transition) in &[(4.0, 1.0), (4.0, 0.5), (2.5, 0.1), (7.3, 3.2)] {
                let timeline = Compositor::default()
                    .compose(&segments(loops, transition, loops % 2 == 0, window))
                    .unwrap();
                let expected = loops as f64 * window - (loops as f64 - 1.0) * transition;
                assert!(
                    (timeline.duration() - expected).abs() < 1e-9,
                    "loops={} window={} transition={}",
                    loops,
                    window,
                    transition
                );
            }
        }
    }

    #[test]
    fn test_single_segment_is_untouched() {
        let timeline = Compositor::default().compose(&segments(1, 0.5, false, 4.0)).unwrap();
        assert_eq!(timeline.duration(), 4.0);
        assert_eq!(timeline.opacity_at(0, 0.0), 1.0);
        assert_eq!(timeline.opacity_at(0, 3.99), 1.0);
    }

    #[test]
    fn test_one_sided_crossfade() {
        let timeline = Compositor::default().compose(&segments(2, 1.0, false, 4.0)).unwrap();

        // Overlap is [3, 4): outgoing layer stays opaque, incoming ramps up
        assert_eq!(timeline.opacity_at(0, 3.5), 1.0);
        assert_eq!(timeline.opacity_at(1, 3.0), 0.0);
        assert!((timeline.opacity_at(1, 3.5) - 0.5).abs() < 1e-12);
        assert_eq!(timeline.opacity_at(1, 4.0), 1.0);
        assert_eq!(timeline.opacity_at(1, 2.0), 0.0);

        assert_eq!(timeline.top_layer_at(2.0), Some(0));
        assert_eq!(timeline.top_layer_at(3.5), Some(1));
        assert_eq!(timeline.top_layer_at(9.0), None);
    }

    #[test]
    fn test_easing_shapes_the_ramp() {
        let timeline = Compositor::new(Easing::EaseIn)
            .compose(&segments(2, 1.0, false, 4.0))
            .unwrap();
        assert!((timeline.opacity_at(1, 3.5) - 0.25).abs() < 1e-12);
        assert_eq!(timeline.easing(), Easing::EaseIn);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let segs = segments(4, 0.5, true, 4.0);
        let compositor = Compositor::default();

        let a = compositor.compose(&segs).unwrap();
        let b = compositor.compose(&segs).unwrap();

        assert_eq!(a.placements(), b.placements());
        assert_eq!(a.duration(), b.duration());
        assert_eq!(a.duration(), 14.5);
    }

    #[test]
    fn test_overlap_longer_than_segment_is_rejected() {
        let mut segs = segments(2, 1.0, false, 4.0);
        segs[1].crossfade_in = 4.0;

        let err = Compositor::default().compose(&segs).unwrap_err();
        assert!(matches!(err, SeamloopError::InvalidLoopPlan { .. }));
    }

    #[test]
    fn test_empty_and_fading_first_segment_are_rejected() {
        assert!(Compositor::default().compose(&[]).is_err());

        let mut segs = segments(2, 1.0, false, 4.0);
        segs[0].crossfade_in = 0.5;
        assert!(Compositor::default().compose(&segs).is_err());
    }
}
