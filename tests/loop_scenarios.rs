use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use seamloop::{
    composition::{Compositor, Easing, LoopEngine, LoopRequest},
    config::Config,
    video::{DurationProber, ProbeReport},
    Result, SeamloopError,
};

/// Prober answering from memory and counting how often it was asked
struct MemoryProber {
    report: ProbeReport,
    calls: Arc<AtomicUsize>,
}

impl DurationProber for MemoryProber {
    fn name(&self) -> &str {
        "memory"
    }

    fn probe(&self, _path: &Path) -> Result<ProbeReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.report.clone())
    }
}

fn report(stream: Option<f64>, container: Option<f64>) -> ProbeReport {
    ProbeReport {
        stream_duration: stream,
        container_duration: container,
        fps: Some(30.0),
        frame_count: None,
        width: 1280,
        height: 720,
        video_codec: "h264".to_string(),
        has_audio: true,
    }
}

fn engine_with(report: ProbeReport) -> (LoopEngine, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let prober = MemoryProber {
        report,
        calls: Arc::clone(&calls),
    };
    (LoopEngine::new(Config::default(), Box::new(prober)), calls)
}

fn request(start: f64, end: f64, loops: u32, transition: f64, reverse: bool) -> LoopRequest {
    LoopRequest {
        input: PathBuf::from("source.mp4"),
        output: PathBuf::from("loop.mp4"),
        trim_start: start,
        trim_end: end,
        loop_count: loops,
        transition,
        reverse,
        easing: Easing::Linear,
    }
}

#[test]
fn three_forward_loops_of_a_ten_second_source() {
    let (engine, _) = engine_with(report(Some(10.0), Some(10.0)));
    let prepared = engine.prepare(&request(0.0, 4.0, 3, 1.0, false)).unwrap();

    assert_eq!(prepared.segments.len(), 3);
    for segment in &prepared.segments {
        assert!(!segment.reversed);
        assert_eq!(segment.duration(), 4.0);
    }
    assert_eq!(prepared.timeline.duration(), 10.0);
    assert_eq!(prepared.plan.output_duration(4.0), prepared.timeline.duration());
}

#[test]
fn four_ping_pong_loops() {
    let (engine, _) = engine_with(report(Some(10.0), Some(10.0)));
    let prepared = engine.prepare(&request(0.0, 4.0, 4, 0.5, true)).unwrap();

    let directions: Vec<&str> = prepared
        .segments
        .iter()
        .map(|s| if s.reversed { "rev" } else { "fwd" })
        .collect();
    assert_eq!(directions, vec!["fwd", "rev", "fwd", "rev"]);
    assert_eq!(prepared.timeline.duration(), 14.5);
}

#[test]
fn end_past_probed_duration_is_clamped() {
    let (engine, _) = engine_with(report(Some(4.0), Some(4.0)));
    let prepared = engine.prepare(&request(0.0, 4.05, 3, 1.0, false)).unwrap();

    assert_eq!(prepared.trim.clamped_from(), Some(4.05));
    assert_eq!(prepared.trim.clip.end(), 4.0);
    assert_eq!(prepared.trim.clip.duration(), 4.0);
}

#[test]
fn end_at_zero_is_rejected() {
    let (engine, _) = engine_with(report(Some(10.0), Some(10.0)));
    let err = engine.prepare(&request(0.0, 0.0, 3, 1.0, false)).unwrap_err();
    assert!(matches!(err, SeamloopError::InvalidTrimWindow { .. }));
}

#[test]
fn single_loop_matches_window_exactly() {
    let (engine, _) = engine_with(report(Some(10.0), Some(10.0)));
    let prepared = engine.prepare(&request(1.25, 5.0, 1, 0.5, true)).unwrap();

    assert_eq!(prepared.segments.len(), 1);
    assert_eq!(prepared.segments[0].crossfade_in, 0.0);
    assert_eq!(prepared.timeline.duration(), prepared.trim.clip.duration());
}

#[test]
fn transition_as_long_as_window_is_rejected() {
    let (engine, calls) = engine_with(report(Some(10.0), Some(10.0)));
    let err = engine.prepare(&request(0.0, 2.0, 3, 2.0, false)).unwrap_err();

    assert!(matches!(err, SeamloopError::InvalidLoopPlan { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn container_estimate_wins_when_estimators_disagree() {
    let (engine, _) = engine_with(report(Some(3.5), Some(4.0)));
    let prepared = engine.prepare(&request(0.0, 4.0, 2, 1.0, false)).unwrap();

    assert_eq!(prepared.source.duration(), 4.0);
    assert_eq!(prepared.source.report().disagreement(), Some(0.5));
    assert_eq!(prepared.trim.clamped_from(), None);
}

#[test]
fn stream_estimate_used_when_container_is_missing() {
    let (engine, _) = engine_with(report(Some(3.5), None));
    let prepared = engine.prepare(&request(0.0, 4.0, 2, 1.0, false)).unwrap();

    assert_eq!(prepared.source.duration(), 3.5);
    assert_eq!(prepared.trim.clamped_from(), Some(4.0));
}

#[test]
fn unknown_duration_is_a_hard_stop() {
    let (engine, _) = engine_with(report(None, None));
    let err = engine.prepare(&request(0.0, 4.0, 3, 1.0, false)).unwrap_err();
    assert!(matches!(err, SeamloopError::DurationUnknown { .. }));
}

#[test]
fn composing_twice_gives_identical_placement() {
    let (engine, _) = engine_with(report(Some(10.0), Some(10.0)));
    let prepared = engine.prepare(&request(0.0, 4.0, 6, 0.7, true)).unwrap();

    let compositor = Compositor::new(Easing::EaseInOut);
    let first = compositor.compose(&prepared.segments).unwrap();
    let second = compositor.compose(&prepared.segments).unwrap();

    assert_eq!(first.placements(), second.placements());
    assert_eq!(first.duration(), second.duration());
}

#[test]
fn engine_is_reusable_across_plans() {
    let (engine, calls) = engine_with(report(Some(10.0), Some(10.0)));

    let a = engine.prepare(&request(0.0, 4.0, 3, 1.0, false)).unwrap();
    let b = engine.prepare(&request(2.0, 8.0, 5, 0.25, true)).unwrap();
    let a_again = engine.prepare(&request(0.0, 4.0, 3, 1.0, false)).unwrap();

    assert_eq!(a.timeline.duration(), 10.0);
    assert_eq!(b.timeline.duration(), 5.0 * 6.0 - 4.0 * 0.25);
    assert_eq!(a.timeline.placements(), a_again.timeline.placements());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn rejected_plan_never_creates_output() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, _) = engine_with(report(Some(10.0), Some(10.0)));

    let mut req = request(0.0, 4.0, 3, 5.0, false);
    req.output = dir.path().join("loop.mp4");

    let err = engine.run(&req).await.unwrap_err();
    assert!(matches!(err, SeamloopError::InvalidLoopPlan { .. }));
    assert!(!req.output.exists());
}
