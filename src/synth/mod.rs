//! Audio segment synthesis.
//!
//! One synchronous call per segment to an external generative audio
//! service, anchored to a reference melody recording. Returns an opaque
//! remote reference (URL) to the generated audio.

pub mod replicate;

use std::path::Path;

use crate::error::Result;

// Re-export commonly used types
pub use replicate::ReplicateClient;

/// Everything one synthesis call needs.
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    /// Text prompt guiding this segment's generation.
    pub prompt: &'a str,

    /// Local path of the reference melody recording. The call reads, but
    /// never modifies, this file.
    pub reference_audio: &'a Path,

    /// Duration of the generated segment in seconds (service max ~30).
    pub duration_sec: u32,

    /// When true, the segment is generated as a stylistic continuation of
    /// the reference rather than an independent rendering.
    pub continuation: bool,
}

/// Renders one audio segment from a prompt and a reference recording.
///
/// Production uses [`ReplicateClient`]; tests substitute a fake.
pub trait SegmentSynthesizer {
    /// Issues one synthesis call, returning the remote URL of the
    /// generated audio.
    fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String>;
}
