//! Song structure types produced by the language model.
//!
//! A SongStructure is the ordered plan for the whole song: one SegmentSpec
//! per segment, in playback order. It is produced once per request and is
//! immutable thereafter.

use serde::{Deserialize, Serialize};

/// Number of segments the language model is asked to plan.
pub const EXPECTED_SEGMENTS: usize = 4;

/// One planned slice of the final song.
///
/// The role label is descriptive only (open vocabulary, not an enum); the
/// pipeline never branches on it. The prompt drives synthesis and must be
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    /// Role label, e.g. "intro", "verse", "chorus", "outro".
    pub segment_type: String,

    /// Natural-language synthesis prompt for this segment.
    pub prompt: String,
}

/// The ordered plan for the whole song.
///
/// Serialization matches the language model's wire shape:
/// `{ "song_structure": [ { "segment_type": ..., "prompt": ... }, ... ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongStructure {
    /// Segments in playback order. Order determines both stitching order
    /// and continuation chaining.
    #[serde(rename = "song_structure")]
    pub segments: Vec<SegmentSpec>,
}

impl SongStructure {
    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the structure has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the structure can drive the pipeline: at least one
    /// segment, every prompt non-empty.
    pub fn is_usable(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| !s.prompt.trim().is_empty())
    }

    /// Builds the deterministic fallback structure used when the language
    /// model's response cannot be parsed as JSON.
    ///
    /// The shape is fixed (intro/verse/chorus/outro) with template prompts
    /// derived from the original description and vibe, so the pipeline
    /// always receives some usable structure.
    pub fn fallback(melody_description: &str, vibe: &str) -> Self {
        Self {
            segments: vec![
                SegmentSpec {
                    segment_type: "intro".to_string(),
                    prompt: format!(
                        "A simple intro based on {} in a {} style.",
                        melody_description, vibe
                    ),
                },
                SegmentSpec {
                    segment_type: "verse".to_string(),
                    prompt: "Introduce a basic drum beat and bassline.".to_string(),
                },
                SegmentSpec {
                    segment_type: "chorus".to_string(),
                    prompt: "The main melody comes in with more energy.".to_string(),
                },
                SegmentSpec {
                    segment_type: "outro".to_string(),
                    prompt: "Fade out with the main melody and a simple beat.".to_string(),
                },
            ],
        }
    }
}
