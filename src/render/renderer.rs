use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::task;
use tracing::{debug, info};

use crate::composition::Timeline;
use crate::config::RenderConfig;
use crate::error::{Result, SeamloopError};
use crate::render::filter_graph::FilterGraph;

/// Video codec every render uses
pub const VIDEO_CODEC: &str = "libx264";

/// Audio codec every render uses
pub const AUDIO_CODEC: &str = "aac";

/// A single render request. Consumed by [`Renderer::render`].
#[derive(Debug, Clone)]
pub struct RenderJob {
    timeline: Timeline,
    output_path: PathBuf,
    video_codec: &'static str,
    audio_codec: &'static str,
}

impl RenderJob {
    pub fn new<P: Into<PathBuf>>(timeline: Timeline, output_path: P) -> Self {
        Self {
            timeline,
            output_path: output_path.into(),
            video_codec: VIDEO_CODEC,
            audio_codec: AUDIO_CODEC,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn video_codec(&self) -> &str {
        self.video_codec
    }

    pub fn audio_codec(&self) -> &str {
        self.audio_codec
    }
}

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub layer_count: usize,
    pub file_size: u64,
}

/// Encodes a timeline into an MP4 file with the external ffmpeg binary
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn check_ffmpeg_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Encode `job` and move the result to its output path.
    ///
    /// ffmpeg writes to a temporary file in the destination directory; it is
    /// renamed into place only after a successful encode and removed on every
    /// failure path, so the output path never holds a partial file.
    pub async fn render(&self, job: RenderJob) -> Result<EncodedVideo> {
        let output_path = job.output_path().to_path_buf();
        let timeline = job.timeline();
        let source = timeline.source();

        info!(
            "Rendering {} layers ({:.3}s) to {:?}",
            timeline.layers().len(),
            timeline.duration(),
            output_path
        );

        let directory = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !directory.is_dir() {
            return Err(SeamloopError::render(format!(
                "output directory {} does not exist",
                directory.display()
            )));
        }

        if same_file(source.path(), &output_path) {
            return Err(SeamloopError::render("output path would overwrite the input file"));
        }

        if !self.check_ffmpeg_available() {
            return Err(SeamloopError::render(format!(
                "ffmpeg not found at '{}'. Please install FFmpeg.",
                self.config.ffmpeg_path
            )));
        }

        let graph = FilterGraph::build(timeline, source.has_audio())?;
        debug!("Filter graph: {}", graph.script);

        let temp_path = tempfile::Builder::new()
            .prefix(".seamloop-")
            .suffix(".mp4")
            .tempfile_in(&directory)
            .map_err(|e| SeamloopError::render_io("cannot create temporary output file", e))?
            .into_temp_path();

        let args = self.build_args(&job, &graph, &temp_path);
        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.args(&args).stdin(Stdio::null());

        let output = task::spawn_blocking(move || cmd.output())
            .await
            .map_err(|e| SeamloopError::render(format!("Failed to spawn FFmpeg process: {}", e)))?
            .map_err(|e| SeamloopError::render_io("FFmpeg execution failed", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SeamloopError::render(format!(
                "FFmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let file_size = std::fs::metadata(&temp_path)
            .map_err(|e| SeamloopError::render_io("encoded file is missing", e))?
            .len();

        if file_size == 0 {
            return Err(SeamloopError::render("FFmpeg produced an empty file"));
        }

        temp_path
            .persist(&output_path)
            .map_err(|e| SeamloopError::render_io("cannot move encoded file into place", e.error))?;

        let encoded = EncodedVideo {
            path: output_path,
            duration: timeline.duration(),
            layer_count: timeline.layers().len(),
            file_size,
        };

        info!(
            "Render complete: {:?}, {:.3}s, {:.1} MB",
            encoded.path,
            encoded.duration,
            encoded.file_size as f64 / 1024.0 / 1024.0
        );

        Ok(encoded)
    }

    /// ffmpeg command line for `job`, writing to `destination`
    pub fn build_args(&self, job: &RenderJob, graph: &FilterGraph, destination: &Path) -> Vec<String> {
        let timeline = job.timeline();
        let source = timeline.source();

        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            source.path().display().to_string(),
            "-filter_complex".into(),
            graph.script.clone(),
            "-map".into(),
            format!("[{}]", graph.video_out),
        ];

        match &graph.audio_out {
            Some(audio) => {
                args.push("-map".into());
                args.push(format!("[{}]", audio));
            }
            None => args.push("-an".into()),
        }

        args.extend([
            "-c:v".into(),
            job.video_codec().to_string(),
            "-preset".into(),
            self.config.preset.clone(),
            "-crf".into(),
            self.quality_to_crf(self.config.quality).to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-r".into(),
            format!("{:.6}", source.fps()),
        ]);

        if graph.audio_out.is_some() {
            args.extend([
                "-c:a".into(),
                job.audio_codec().to_string(),
                "-b:a".into(),
                self.config.audio_bitrate.clone(),
            ]);
        }

        args.extend([
            "-t".into(),
            format!("{:.6}", timeline.duration()),
            "-threads".into(),
            self.config.threads.to_string(),
        ]);

        if self.config.faststart {
            args.extend(["-movflags".into(), "+faststart".into()]);
        }

        args.extend(["-f".into(), "mp4".into(), destination.display().to_string()]);
        args
    }

    fn quality_to_crf(&self, quality: u8) -> u8 {
        (51 - ((quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
