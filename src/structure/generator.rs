//! StructureGenerator: melody description + vibe -> SongStructure.
//!
//! The generator owns prompt construction and response parsing; the actual
//! model call goes through the [`LanguageModel`] trait so tests can inject
//! canned responses.

use crate::error::{PipelineError, Result};
use crate::types::{SongStructure, EXPECTED_SEGMENTS};

/// A text-completion language model.
///
/// Production uses [`GeminiClient`](super::gemini::GeminiClient); tests
/// substitute a fake.
pub trait LanguageModel {
    /// Sends a prompt and returns the model's raw text response.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Generates song structures through a language model.
pub struct StructureGenerator {
    model: Box<dyn LanguageModel + Send + Sync>,
}

impl StructureGenerator {
    /// Creates a generator backed by the given model.
    pub fn new(model: Box<dyn LanguageModel + Send + Sync>) -> Self {
        Self { model }
    }

    /// Generates an ordered song structure for the given melody description
    /// and vibe.
    ///
    /// The model is asked for a JSON object with a `song_structure` array of
    /// exactly four segments. A response that is not JSON at all is recovered
    /// locally with the deterministic fallback structure; a service failure,
    /// or valid JSON that lacks a usable `song_structure` array, is fatal for
    /// the request.
    pub fn generate_structure(
        &self,
        melody_description: &str,
        vibe: &str,
    ) -> Result<SongStructure> {
        let prompt = build_structure_prompt(melody_description, vibe);
        let response = self.model.complete(&prompt)?;

        // Two distinct failure shapes: prose instead of JSON is the model
        // ignoring the output format, recoverable with the fallback; valid
        // JSON with the wrong shape means the contract itself is broken
        let value = match serde_json::from_str::<serde_json::Value>(strip_code_fences(&response)) {
            Ok(value) => value,
            Err(e) => {
                eprintln!(
                    "Language model did not return valid JSON ({}); using default structure",
                    e
                );
                return Ok(SongStructure::fallback(melody_description, vibe));
            }
        };

        let structure = serde_json::from_value::<SongStructure>(value).map_err(|e| {
            PipelineError::structure_unavailable(format!(
                "response is valid JSON but not a song structure: {}",
                e
            ))
        })?;

        if !structure.is_usable() {
            return Err(PipelineError::structure_unavailable(
                "structure has no segments or contains an empty prompt",
            ));
        }

        Ok(structure)
    }
}

/// Builds the fixed instructional prompt sent to the language model.
///
/// The first segment's prompt must incorporate the melody description and
/// vibe; later prompts must describe how the song evolves so the segments
/// form a cohesive narrative.
fn build_structure_prompt(melody_description: &str, vibe: &str) -> String {
    format!(
        r#"You are an expert music producer AI. Your task is to create a compelling song structure based on a user's description of a melody and a desired vibe.

The user will provide:
1. A description of a hummed melody (e.g., "a simple, melancholic melody").
2. A desired style or vibe (e.g., "lo-fi hip hop beat").

You must generate a JSON object that outlines the song structure. The structure should consist of {segments} segments.
Each segment must have a "segment_type" (e.g., "intro", "verse", "chorus", "outro") and a "prompt" that will be fed into a music generation model (like MusicGen).

The prompts for each segment should be descriptive and build upon each other to create a cohesive song.
For the first segment (intro), the prompt should incorporate the user's hum description and style.
For subsequent segments, the prompts should describe how the song should evolve (e.g., "add a simple bassline", "introduce a lead synth melody", "fade out with the main melody").

**User's Hum Description:** "{melody_description}"
**Desired Vibe:** "{vibe}"

**Output JSON:**
"#,
        segments = EXPECTED_SEGMENTS,
        melody_description = melody_description,
        vibe = vibe,
    )
}

/// Strips a surrounding markdown code fence, if present.
///
/// Chat models routinely wrap JSON in ```json fences; the content inside is
/// still parsed strictly.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence's language tag line and the closing fence
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .trim_end()
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    struct CannedModel {
        response: std::result::Result<String, (ErrorCode, String)>,
    }

    impl LanguageModel for CannedModel {
        fn complete(&self, _prompt: &str) -> Result<String> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err((code, message)) => Err(PipelineError::new(*code, message.clone())),
            }
        }
    }

    fn generator(response: &str) -> StructureGenerator {
        StructureGenerator::new(Box::new(CannedModel {
            response: Ok(response.to_string()),
        }))
    }

    const GOOD_JSON: &str = r#"{
        "song_structure": [
            {"segment_type": "intro", "prompt": "soft keys over a hum"},
            {"segment_type": "verse", "prompt": "add a simple bassline"},
            {"segment_type": "chorus", "prompt": "introduce a lead synth"},
            {"segment_type": "outro", "prompt": "fade out with the melody"}
        ]
    }"#;

    #[test]
    fn valid_json_is_used() {
        let structure = generator(GOOD_JSON)
            .generate_structure("a hum", "lo-fi")
            .unwrap();
        assert_eq!(structure.len(), 4);
        assert_eq!(structure.segments[1].prompt, "add a simple bassline");
    }

    #[test]
    fn fenced_json_is_accepted() {
        let fenced =
            "```json\n{\"song_structure\": [{\"segment_type\": \"intro\", \"prompt\": \"keys\"}]}\n```";
        let structure = generator(fenced).generate_structure("a hum", "lo-fi").unwrap();
        assert_eq!(structure.len(), 1);
        assert_eq!(structure.segments[0].prompt, "keys");
    }

    #[test]
    fn unparseable_response_falls_back() {
        let structure = generator("Here is your song structure! It goes like...")
            .generate_structure("a catchy hum", "synthwave")
            .unwrap();
        assert_eq!(
            structure,
            SongStructure::fallback("a catchy hum", "synthwave")
        );
        assert!(structure.is_usable());
    }

    #[test]
    fn fallback_is_same_for_any_garbage() {
        let a = generator("not json at all")
            .generate_structure("hum", "vibe")
            .unwrap();
        let b = generator("{\"song_structure\": oops")
            .generate_structure("hum", "vibe")
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn valid_json_without_structure_is_fatal() {
        // The model answered in valid JSON, so the contract is broken rather
        // than the output format; no fallback applies
        let err = generator(r#"{"something_else": []}"#)
            .generate_structure("hum", "vibe")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StructureUnavailable);

        let err = generator(r#"{"song_structure": []}"#)
            .generate_structure("hum", "vibe")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StructureUnavailable);
    }

    #[test]
    fn empty_prompt_segment_is_fatal() {
        let json = r#"{"song_structure": [{"segment_type": "intro", "prompt": "  "}]}"#;
        let err = generator(json).generate_structure("hum", "vibe").unwrap_err();
        assert_eq!(err.code, ErrorCode::StructureUnavailable);
    }

    #[test]
    fn model_failure_propagates() {
        let failing = StructureGenerator::new(Box::new(CannedModel {
            response: Err((ErrorCode::StructureUnavailable, "network down".to_string())),
        }));
        let err = failing.generate_structure("hum", "vibe").unwrap_err();
        assert_eq!(err.code, ErrorCode::StructureUnavailable);
    }

    #[test]
    fn prompt_embeds_inputs() {
        let prompt = build_structure_prompt("a melancholic hum", "lo-fi hip hop");
        assert!(prompt.contains("a melancholic hum"));
        assert!(prompt.contains("lo-fi hip hop"));
        assert!(prompt.contains("song_structure") || prompt.contains("segment_type"));
        assert!(prompt.contains("4 segments"));
    }

    #[test]
    fn code_fence_stripping() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
