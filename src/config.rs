use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    composition::Easing,
    error::{ConfigError, Result},
    sequence::{MAX_LOOP_COUNT, MIN_LOOP_COUNT},
    video::DurationEstimator,
};

/// x264 presets accepted by the renderer
const X264_PRESETS: &[&str] = &[
    "ultrafast", "superfast", "veryfast", "faster", "fast", "medium", "slow", "slower", "veryslow",
];

/// Main configuration for seamloop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Encoder settings
    pub render: RenderConfig,

    /// Duration probing settings
    pub probe: ProbeConfig,

    /// Trim window settings
    pub trim: TrimConfig,

    /// Defaults for loop parameters the caller leaves out
    pub looping: LoopConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.probe.validate()?;
        self.trim.validate()?;
        self.looping.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Encoder configuration
///
/// The codecs themselves are fixed (H.264 video, AAC audio); only their
/// tuning is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// ffmpeg executable
    pub ffmpeg_path: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,

    /// x264 speed/compression preset
    pub preset: String,

    /// AAC bitrate, in ffmpeg notation
    pub audio_bitrate: String,

    /// Encoder threads
    pub threads: usize,

    /// Move the MP4 index to the front of the file
    pub faststart: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            quality: 85,
            preset: "medium".to_string(),
            audio_bitrate: "192k".to_string(),
            threads: num_cpus::get(),
            faststart: true,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            return Err(invalid("render.quality", self.quality).into());
        }

        if !X264_PRESETS.contains(&self.preset.as_str()) {
            return Err(invalid("render.preset", &self.preset).into());
        }

        if self.threads == 0 {
            return Err(invalid("render.threads", self.threads).into());
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(invalid("render.ffmpeg_path", "<empty>").into());
        }

        Ok(())
    }
}

/// Duration probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// ffprobe executable
    pub ffprobe_path: String,

    /// Estimator trusted first when both report a duration
    pub prefer: DurationEstimator,

    /// Disagreement (seconds) above which a warning is logged
    pub disagreement_tolerance: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
            prefer: DurationEstimator::Container,
            disagreement_tolerance: 0.1,
        }
    }
}

impl ProbeConfig {
    fn validate(&self) -> Result<()> {
        if !self.disagreement_tolerance.is_finite() || self.disagreement_tolerance < 0.0 {
            return Err(invalid("probe.disagreement_tolerance", self.disagreement_tolerance).into());
        }

        if self.ffprobe_path.trim().is_empty() {
            return Err(invalid("probe.ffprobe_path", "<empty>").into());
        }

        Ok(())
    }
}

/// Trim window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// A window must be strictly longer than this (seconds)
    pub min_window: f64,

    /// Window end used when the caller gives none (seconds)
    pub default_end: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            min_window: 0.1,
            default_end: 4.0,
        }
    }
}

impl TrimConfig {
    fn validate(&self) -> Result<()> {
        if !self.min_window.is_finite() || self.min_window <= 0.0 {
            return Err(invalid("trim.min_window", self.min_window).into());
        }

        if !self.default_end.is_finite() || self.default_end <= self.min_window {
            return Err(invalid("trim.default_end", self.default_end).into());
        }

        Ok(())
    }
}

/// Loop parameter defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Number of repetitions
    pub loop_count: u32,

    /// Crossfade duration between repetitions (seconds)
    pub transition: f64,

    /// Play every other repetition backwards
    pub reverse: bool,

    /// Opacity curve of the incoming repetition
    pub easing: Easing,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            loop_count: 3,
            transition: 1.0,
            reverse: false,
            easing: Easing::Linear,
        }
    }
}

impl LoopConfig {
    fn validate(&self) -> Result<()> {
        if !(MIN_LOOP_COUNT..=MAX_LOOP_COUNT).contains(&self.loop_count) {
            return Err(invalid("looping.loop_count", self.loop_count).into());
        }

        if !self.transition.is_finite() || self.transition <= 0.0 {
            return Err(invalid("looping.transition", self.transition).into());
        }

        Ok(())
    }
}
