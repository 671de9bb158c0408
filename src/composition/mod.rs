//! # Composition
//!
//! Places loop segments on a single overlapping timeline and drives the
//! whole probe → trim → build → compose → render pipeline.

pub mod easing;
pub mod engine;
pub mod timeline;

// Re-exports for convenience
pub use easing::Easing;
pub use engine::{LoopEngine, LoopRequest, PreparedLoop};
pub use timeline::{Compositor, Layer, Timeline};
