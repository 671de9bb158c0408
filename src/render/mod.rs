//! # Rendering
//!
//! Lowers a composed [`Timeline`](crate::composition::Timeline) to an ffmpeg
//! filter graph and encodes it to a single MP4 file.

pub mod filter_graph;
pub mod renderer;

pub use filter_graph::FilterGraph;
pub use renderer::{EncodedVideo, RenderJob, Renderer, AUDIO_CODEC, VIDEO_CODEC};
