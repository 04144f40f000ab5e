// src/audio/mod.rs
//! Audio subsystem: playback, analysis, and visualization.

pub mod analysis;
pub mod controller;
pub mod sample_capture;
pub mod source;
pub mod visualizer;

// Re-export the types the rest of the crate works with.
pub use analysis::AnalysisGraph;
pub use controller::{PlaybackController, RepeatMode};
pub use source::{AudioSource, SourceEvent};
pub use visualizer::{RenderMode, Visualizer};
