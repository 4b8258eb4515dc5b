//! Gemini REST client for structure generation.
//!
//! Calls the `generateContent` endpoint of the Generative Language API and
//! extracts the first candidate's text.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

use super::generator::LanguageModel;

/// Model used for song structure generation.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Sampling temperature for structure generation.
const TEMPERATURE: f32 = 0.7;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GeminiClient {
    /// Creates a client for the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                PipelineError::structure_unavailable(format!(
                    "Failed to create HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the service base URL (used to point at a local stand-in).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl LanguageModel for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            PipelineError::structure_unavailable(format!("request to language model failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(PipelineError::structure_unavailable(format!(
                "language model returned HTTP {}",
                response.status()
            )));
        }

        let parsed: GenerateContentResponse = response.json().map_err(|e| {
            PipelineError::structure_unavailable(format!(
                "malformed language model response envelope: {}",
                e
            ))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                PipelineError::structure_unavailable("language model returned no candidates")
            })?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: "write a song".to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.7 },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "write a song");
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn response_envelope_parsing() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"song_structure\": []}"}], "role": "model"}}
            ]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(
            parsed.candidates[0].content.parts[0].text,
            "{\"song_structure\": []}"
        );
    }

    #[test]
    fn empty_envelope_parses_to_no_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn unreachable_service_is_structure_unavailable() {
        let client = GeminiClient::new("test-key")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let err = client.complete("hello").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::StructureUnavailable);
    }
}
