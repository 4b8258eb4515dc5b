//! The generation-and-stitching pipeline.
//!
//! Composes structure generation, per-segment synthesis, artifact
//! retrieval, and crossfade stitching into one all-or-nothing request
//! flow with a single cleanup routine on every abort path.

pub mod orchestrator;

// Re-export commonly used types
pub use orchestrator::{Pipeline, PipelineStage};
