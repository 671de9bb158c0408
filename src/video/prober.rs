use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SeamloopError};

/// Which of the two independent duration estimates to trust first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationEstimator {
    /// Duration recorded in the container header
    #[default]
    Container,
    /// Duration reported for the video stream by the demuxer/decoder
    Stream,
}

impl DurationEstimator {
    pub fn other(self) -> Self {
        match self {
            DurationEstimator::Container => DurationEstimator::Stream,
            DurationEstimator::Stream => DurationEstimator::Container,
        }
    }
}

impl std::fmt::Display for DurationEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationEstimator::Container => write!(f, "container"),
            DurationEstimator::Stream => write!(f, "stream"),
        }
    }
}

/// Everything a probe learned about an input file
///
/// Both duration estimates are kept. Either may be missing: containers can
/// carry stale or absent headers, and some streams never report a length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub stream_duration: Option<f64>,
    pub container_duration: Option<f64>,
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub video_codec: String,
    pub has_audio: bool,
}

impl ProbeReport {
    pub fn estimate(&self, estimator: DurationEstimator) -> Option<f64> {
        match estimator {
            DurationEstimator::Container => self.container_duration,
            DurationEstimator::Stream => self.stream_duration,
        }
    }

    /// Resolve the authoritative duration.
    ///
    /// Uses the preferred estimator when it produced a value, the other one
    /// otherwise. `None` means the duration is unknown and the caller must stop.
    pub fn duration(&self, prefer: DurationEstimator) -> Option<(f64, DurationEstimator)> {
        self.estimate(prefer)
            .map(|d| (d, prefer))
            .or_else(|| self.estimate(prefer.other()).map(|d| (d, prefer.other())))
    }

    /// Absolute difference between the two estimates, when both exist
    pub fn disagreement(&self) -> Option<f64> {
        match (self.stream_duration, self.container_duration) {
            (Some(stream), Some(container)) => Some((stream - container).abs()),
            _ => None,
        }
    }

    /// Parse the JSON printed by `ffprobe -print_format json -show_format -show_streams`
    pub fn from_ffprobe_json(json: &[u8]) -> std::result::Result<Self, String> {
        let output: FfprobeOutput =
            serde_json::from_slice(json).map_err(|e| format!("invalid ffprobe output: {}", e))?;

        let video = output
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| "no video stream found".to_string())?;

        let has_audio = output
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        let fps = video
            .avg_frame_rate
            .as_deref()
            .and_then(parse_frame_rate)
            .or_else(|| video.r_frame_rate.as_deref().and_then(parse_frame_rate));

        let frame_count = video.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok());

        // Streams without a duration field (Matroska, WebM) still let the
        // demuxer count frames, which gives an independent estimate.
        let stream_duration = video
            .duration
            .as_deref()
            .and_then(parse_seconds)
            .or_else(|| match (frame_count, fps) {
                (Some(frames), Some(fps)) if frames > 0 => Some(frames as f64 / fps),
                _ => None,
            });

        let container_duration = output
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(parse_seconds);

        Ok(Self {
            stream_duration,
            container_duration,
            fps,
            frame_count,
            width: video.width.unwrap_or(0),
            height: video.height.unwrap_or(0),
            video_codec: video.codec_name.clone().unwrap_or_else(|| "unknown".to_string()),
            has_audio,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Parse "30000/1001" or "25" into frames per second
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };

    (fps.is_finite() && fps > 0.0).then_some(fps)
}

fn parse_seconds(value: &str) -> Option<f64> {
    let seconds: f64 = value.trim().parse().ok()?;
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

/// Source of clip metadata
pub trait DurationProber: Send + Sync {
    /// Returns the unique name of this prober
    fn name(&self) -> &str;

    /// Probe a local file.
    ///
    /// A file that cannot be opened or decoded yields `InputUnreadable`. A
    /// readable file whose length cannot be measured yields a report with
    /// both duration estimates set to `None`.
    fn probe(&self, path: &Path) -> Result<ProbeReport>;
}

/// Prober backed by the external `ffprobe` binary
pub struct FfprobeProber {
    ffprobe_path: String,
    tolerance: f64,
}

impl FfprobeProber {
    pub fn new<S: Into<String>>(ffprobe_path: S, tolerance: f64) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            tolerance,
        }
    }

    pub fn check_available(&self) -> bool {
        Command::new(&self.ffprobe_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe", 0.1)
    }
}

impl DurationProber for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> Result<ProbeReport> {
        let shown = path.display().to_string();

        if !path.is_file() {
            return Err(SeamloopError::input_unreadable(&shown, "file does not exist"));
        }

        debug!("Probing {} with {}", shown, self.ffprobe_path);

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SeamloopError::input_unreadable(&shown, format!("could not run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SeamloopError::input_unreadable(
                &shown,
                format!("ffprobe failed: {}", stderr.trim()),
            ));
        }

        let report = ProbeReport::from_ffprobe_json(&output.stdout)
            .map_err(|reason| SeamloopError::input_unreadable(&shown, reason))?;

        info!(
            "Probed {}: stream {:?}s, container {:?}s, {}x{} @ {:.2} fps, audio: {}",
            shown,
            report.stream_duration,
            report.container_duration,
            report.width,
            report.height,
            report.fps.unwrap_or(0.0),
            report.has_audio
        );

        if let Some(diff) = report.disagreement() {
            if diff > self.tolerance {
                warn!(
                    "Duration estimates for {} disagree by {:.3}s (stream {:.3}s, container {:.3}s)",
                    shown,
                    diff,
                    report.stream_duration.unwrap_or_default(),
                    report.container_duration.unwrap_or_default()
                );
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FFPROBE_MP4: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1280,
                "height": 720,
                "r_frame_rate": "30/1",
                "avg_frame_rate": "30000/1001",
                "duration": "4.004000",
                "nb_frames": "120"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "duration": "4.010000"
            }
        ],
        "format": {
            "filename": "clip.mp4",
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "duration": "4.010000"
        }
    }"#;

    #[test]
    fn test_parse_both_estimates() {
        let report = ProbeReport::from_ffprobe_json(FFPROBE_MP4.as_bytes()).unwrap();

        assert_eq!(report.stream_duration, Some(4.004));
        assert_eq!(report.container_duration, Some(4.01));
        assert_eq!(report.width, 1280);
        assert_eq!(report.height, 720);
        assert_eq!(report.video_codec, "h264");
        assert_eq!(report.frame_count, Some(120));
        assert!(report.has_audio);
        assert!((report.fps.unwrap() - 29.97).abs() < 0.01);

        let diff = report.disagreement().unwrap();
        assert!((diff - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_stream_duration_from_frame_count() {
        let json = r#"{
            "streams": [
                {"codec_type": "video", "width": 320, "height": 240,
                 "avg_frame_rate": "25/1", "nb_frames": "100"}
            ],
            "format": {}
        }"#;

        let report = ProbeReport::from_ffprobe_json(json.as_bytes()).unwrap();
        assert_eq!(report.stream_duration, Some(4.0));
        assert_eq!(report.container_duration, None);
        assert!(!report.has_audio);
        assert_eq!(report.disagreement(), None);
    }

    #[test]
    fn test_missing_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
        assert!(ProbeReport::from_ffprobe_json(json.as_bytes()).is_err());
        assert!(ProbeReport::from_ffprobe_json(b"not json").is_err());
    }

    #[test]
    fn test_duration_resolution_prefers_requested_estimator() {
        let report = ProbeReport {
            stream_duration: Some(3.9),
            container_duration: Some(4.0),
            ..Default::default()
        };

        assert_eq!(
            report.duration(DurationEstimator::Container),
            Some((4.0, DurationEstimator::Container))
        );
        assert_eq!(
            report.duration(DurationEstimator::Stream),
            Some((3.9, DurationEstimator::Stream))
        );
    }

    #[test]
    fn test_duration_falls_back_to_other_estimator() {
        let report = ProbeReport {
            stream_duration: Some(3.9),
            container_duration: None,
            ..Default::default()
        };
        assert_eq!(
            report.duration(DurationEstimator::Container),
            Some((3.9, DurationEstimator::Stream))
        );

        let unknown = ProbeReport::default();
        assert_eq!(unknown.duration(DurationEstimator::Container), None);
    }

    #[test]
    fn test_zero_and_garbage_durations_are_ignored() {
        assert_eq!(parse_seconds("0.000000"), None);
        assert_eq!(parse_seconds("N/A"), None);
        assert_eq!(parse_seconds("nan"), None);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let prober = FfprobeProber::default();
        let err = prober.probe(Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, SeamloopError::InputUnreadable { .. }));
    }
}
