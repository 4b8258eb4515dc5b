//! Local audio artifacts produced while a request is in flight.

use std::path::PathBuf;

use super::structure::SegmentSpec;

/// A generated segment downloaded into local storage.
///
/// Owned by the orchestrator; deleted unconditionally once stitching
/// completes or the request aborts.
#[derive(Debug, Clone)]
pub struct SegmentArtifact {
    /// Local path of the downloaded segment audio.
    pub path: PathBuf,

    /// The spec this segment was synthesized from.
    pub spec: SegmentSpec,

    /// Zero-based position in the song structure.
    pub index: usize,
}

impl SegmentArtifact {
    /// Creates a new artifact record.
    pub fn new(path: PathBuf, spec: SegmentSpec, index: usize) -> Self {
        Self { path, spec, index }
    }
}

/// The final merged song, the request's terminal deliverable.
///
/// Ownership transfers to the caller for delivery and eventual disposal;
/// the pipeline does not delete it.
#[derive(Debug, Clone)]
pub struct StitchedSong {
    /// Path of the stitched audio file.
    pub path: PathBuf,

    /// Duration of the stitched audio in seconds.
    pub duration_sec: f32,
}
