//! # seamloop
//!
//! Turn a short video into a seamless loop: trim a window, repeat it, and
//! crossfade each repetition into the previous one, optionally playing every
//! other repetition backwards for a ping-pong effect.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seamloop::{
//!     composition::{LoopEngine, LoopRequest},
//!     config::Config,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut request = LoopRequest::with_defaults("clip.mp4", "loop.mp4", &config);
//! request.loop_count = 4;
//! request.transition = 0.5;
//! request.reverse = true;
//!
//! let engine = LoopEngine::with_ffprobe(config);
//! let encoded = engine.run(&request).await?;
//! println!("{:.2}s loop written", encoded.duration);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - probing, clip views and trimming
//! - [`sequence`] - loop plans and the repetition builder
//! - [`composition`] - timeline placement and the pipeline engine
//! - [`render`] - ffmpeg filter graph and encoding
//! - [`config`] - configuration management
//!
//! ## Custom probing
//!
//! The engine only needs something that implements
//! [`DurationProber`](video::DurationProber):
//!
//! ```rust,no_run
//! use std::path::Path;
//! use seamloop::video::{DurationProber, ProbeReport};
//! use seamloop::Result;
//!
//! struct SidecarProber;
//!
//! impl DurationProber for SidecarProber {
//!     fn name(&self) -> &str {
//!         "sidecar"
//!     }
//!
//!     fn probe(&self, path: &Path) -> Result<ProbeReport> {
//!         // Read metadata from wherever it lives
//!         Ok(ProbeReport::default())
//!     }
//! }
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod render;
pub mod sequence;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{Compositor, Easing, LoopEngine, LoopRequest, Timeline},
    config::Config,
    error::{Result, SeamloopError},
    render::{EncodedVideo, Renderer},
    sequence::{LoopPlan, LoopSegment, LoopSequenceBuilder},
    video::{DurationProber, MediaClip, Trimmer},
};
