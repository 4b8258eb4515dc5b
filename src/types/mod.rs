//! Core types for the pulse-daemon.
//!
//! This module re-exports all the core data types used throughout the pipeline:
//! - [`GenerationRequest`]: A submitted hum plus its textual descriptions
//! - [`SongStructure`] / [`SegmentSpec`]: The ordered plan for the song
//! - [`SegmentArtifact`] / [`StitchedSong`]: Local audio produced by the pipeline

mod artifact;
mod request;
mod structure;

// Re-export all types at the module level
pub use artifact::{SegmentArtifact, StitchedSong};
pub use request::{generate_request_id, GenerationRequest, DEFAULT_HUM_DESCRIPTION, DEFAULT_VIBE};
pub use structure::{SegmentSpec, SongStructure, EXPECTED_SEGMENTS};
