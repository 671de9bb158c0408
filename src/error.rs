use thiserror::Error;

/// Main error type for the seamloop library
///
/// Every variant is fatal for the job that produced it. Nothing is retried
/// internally; retrying (for instance re-probing with the other duration
/// estimator) is left to the caller.
#[derive(Error, Debug)]
pub enum SeamloopError {
    #[error("Input unreadable: {path} ({reason})")]
    InputUnreadable { path: String, reason: String },

    #[error("Duration unknown for {path}: {reason}")]
    DurationUnknown { path: String, reason: String },

    #[error("Invalid trim window [{start:.3}, {end:.3}) on a {duration:.3}s source: {reason}")]
    InvalidTrimWindow {
        start: f64,
        end: f64,
        duration: f64,
        reason: String,
    },

    #[error("Invalid loop plan: {reason}")]
    InvalidLoopPlan { reason: String },

    #[error("Render failed: {reason}")]
    RenderFailure {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} ({reason})")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using SeamloopError
pub type Result<T> = std::result::Result<T, SeamloopError>;

impl SeamloopError {
    pub fn input_unreadable<P: std::fmt::Display, S: Into<String>>(path: P, reason: S) -> Self {
        Self::InputUnreadable {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_plan<S: Into<String>>(reason: S) -> Self {
        Self::InvalidLoopPlan {
            reason: reason.into(),
        }
    }

    pub fn render<S: Into<String>>(reason: S) -> Self {
        Self::RenderFailure {
            reason: reason.into(),
            source: None,
        }
    }

    /// Render failure that keeps the underlying I/O error for diagnostics
    pub fn render_io<S: Into<String>>(reason: S, source: std::io::Error) -> Self {
        Self::RenderFailure {
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Short, stable name of the error kind (useful for exit codes and logs)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputUnreadable { .. } => "input_unreadable",
            Self::DurationUnknown { .. } => "duration_unknown",
            Self::InvalidTrimWindow { .. } => "invalid_trim_window",
            Self::InvalidLoopPlan { .. } => "invalid_loop_plan",
            Self::RenderFailure { .. } => "render_failure",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::InputUnreadable { path, .. } => {
                format!("Could not read video file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::DurationUnknown { path, .. } => {
                format!("Could not determine how long '{}' is, so no loop was made.", path)
            }
            Self::InvalidTrimWindow { start, end, duration, .. } => {
                format!(
                    "The trim window {:.2}s - {:.2}s does not fit inside the {:.2}s video.",
                    start, end, duration
                )
            }
            Self::InvalidLoopPlan { reason } => {
                format!("The loop settings are not usable: {}.", reason)
            }
            Self::RenderFailure { reason, .. } => {
                format!("Encoding the looped video failed: {}", reason)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
