use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    composition::{Compositor, Easing, Timeline},
    config::Config,
    error::Result,
    render::{EncodedVideo, RenderJob, Renderer},
    sequence::{LoopPlan, LoopSegment, LoopSequenceBuilder},
    video::{DurationProber, FfprobeProber, MediaClip, MediaSource, TrimOutcome, Trimmer},
};

/// Everything the caller supplies for one loop
#[derive(Debug, Clone)]
pub struct LoopRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub trim_start: f64,
    pub trim_end: f64,
    pub loop_count: u32,
    pub transition: f64,
    pub reverse: bool,
    pub easing: Easing,
}

impl LoopRequest {
    /// A request using the configured defaults for every parameter
    pub fn with_defaults<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q, config: &Config) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            trim_start: 0.0,
            trim_end: config.trim.default_end,
            loop_count: config.looping.loop_count,
            transition: config.looping.transition,
            reverse: config.looping.reverse,
            easing: config.looping.easing,
        }
    }
}

/// The fully validated pipeline state right before encoding
#[derive(Debug, Clone)]
pub struct PreparedLoop {
    pub source: Arc<MediaSource>,
    pub trim: TrimOutcome,
    pub plan: LoopPlan,
    pub segments: Vec<LoopSegment>,
    pub timeline: Timeline,
}

/// Main engine that turns one input clip into a seamless loop
///
/// The engine follows a clear pipeline:
/// 1. Probe - measure the input and resolve its duration
/// 2. Trim - cut the base window
/// 3. Sequence - expand the window into repetitions
/// 4. Compose - lay repetitions out with overlapping crossfades
/// 5. Render - encode the timeline to the output file
///
/// Steps 1-4 are validation and arithmetic only; every parameter error
/// surfaces before the encoder is started. The engine keeps no state
/// between requests.
pub struct LoopEngine {
    config: Config,
    prober: Box<dyn DurationProber>,
}

impl LoopEngine {
    /// Create a new engine with the given configuration and prober
    pub fn new(config: Config, prober: Box<dyn DurationProber>) -> Self {
        Self { config, prober }
    }

    /// Create an engine probing with the configured ffprobe binary
    pub fn with_ffprobe(config: Config) -> Self {
        let prober = FfprobeProber::new(
            config.probe.ffprobe_path.clone(),
            config.probe.disagreement_tolerance,
        );
        Self::new(config, Box::new(prober))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline and write the loop to `request.output`
    pub async fn run(&self, request: &LoopRequest) -> Result<EncodedVideo> {
        info!("🔁 Starting seamloop");
        info!("   Input: {:?}", request.input);
        info!("   Output: {:?}", request.output);

        let prepared = self.prepare(request)?;

        // ==========================================
        // PIPELINE STEP 5: RENDER
        // ==========================================
        info!("🎬 Step 5: Rendering...");
        let renderer = Renderer::new(self.config.render.clone());
        let job = RenderJob::new(prepared.timeline, &request.output);
        let encoded = renderer.render(job).await?;

        info!("🎉 Loop complete! Output saved to: {:?}", encoded.path);
        Ok(encoded)
    }

    /// Run steps 1-4 without encoding anything
    pub fn prepare(&self, request: &LoopRequest) -> Result<PreparedLoop> {
        // Range checks that need no input file go first
        let plan = LoopPlan::new(request.loop_count, request.transition, request.reverse)?;

        let source = self.probe_source(request)?;
        let trim = self.trim_window(&source, request)?;
        let segments = self.build_sequence(&trim.clip, plan)?;
        let timeline = self.compose(&segments, request.easing)?;

        Ok(PreparedLoop {
            source,
            trim,
            plan,
            segments,
            timeline,
        })
    }

    // ==========================================
    // PIPELINE STEP 1: PROBE
    // ==========================================

    fn probe_source(&self, request: &LoopRequest) -> Result<Arc<MediaSource>> {
        info!("🔎 Step 1: Probing input with {}...", self.prober.name());

        let report = self.prober.probe(&request.input)?;
        let source = MediaSource::from_report(&request.input, report, self.config.probe.prefer)?;

        info!(
            "   Duration: {:.3}s (from {} estimate), {}x{} @ {:.2} fps",
            source.duration(),
            source.estimator(),
            source.resolution().0,
            source.resolution().1,
            source.fps()
        );
        if let Some(diff) = source.report().disagreement() {
            info!("   Estimator disagreement: {:.3}s", diff);
        }

        Ok(Arc::new(source))
    }

    // ==========================================
    // PIPELINE STEP 2: TRIM
    // ==========================================

    fn trim_window(&self, source: &Arc<MediaSource>, request: &LoopRequest) -> Result<TrimOutcome> {
        info!("✂️  Step 2: Trimming [{:.3}, {:.3})...", request.trim_start, request.trim_end);

        let full = MediaClip::from_source(Arc::clone(source));
        let trimmer = Trimmer::new(self.config.trim.min_window);
        let outcome = trimmer.trim(&full, request.trim_start, request.trim_end)?;

        if let Some(requested) = outcome.clamped_from() {
            info!(
                "   End clamped from {:.3}s to the source duration {:.3}s",
                requested,
                outcome.clip.end()
            );
        }
        info!("   Window: {:.3}s ({} frames)", outcome.clip.duration(), outcome.clip.frame_count());

        Ok(outcome)
    }

    // ==========================================
    // PIPELINE STEP 3: SEQUENCE
    // ==========================================

    fn build_sequence(&self, base: &MediaClip, plan: LoopPlan) -> Result<Vec<LoopSegment>> {
        info!(
            "🔂 Step 3: Building {} repetitions (crossfade {:.3}s, ping-pong: {})...",
            plan.loop_count(),
            plan.transition(),
            plan.reverse()
        );

        let segments = LoopSequenceBuilder::new(plan).build(base)?;
        for segment in &segments {
            debug!(
                "   #{} {} crossfade-in {:.3}s",
                segment.index,
                if segment.reversed { "reversed" } else { "forward" },
                segment.crossfade_in
            );
        }
        Ok(segments)
    }

    // ==========================================
    // PIPELINE STEP 4: COMPOSE
    // ==========================================

    fn compose(&self, segments: &[LoopSegment], easing: Easing) -> Result<Timeline> {
        info!("🎞️  Step 4: Composing timeline ({} easing)...", easing);

        let timeline = Compositor::new(easing).compose(segments)?;
        info!(
            "   ✅ {} layers, output duration {:.3}s",
            timeline.layers().len(),
            timeline.duration()
        );
        Ok(timeline)
    }
}
