//! Replicate MusicGen client.
//!
//! Creates a prediction against the `meta/musicgen` stereo-melody-large
//! model and polls it to a terminal status. The reference recording is
//! embedded in the request as a base64 data URI.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, PipelineError, Result};

use super::{SegmentSynthesizer, SynthesisRequest};

/// Version pin for the 'stereo-melody-large' MusicGen model.
pub const MUSICGEN_VERSION: &str =
    "7a76a8258b23fae65c5a22debb8841d1d7e816b75c2f24218cd2bd8573787906";

/// Fixed sampling temperature for all segments.
const TEMPERATURE: f32 = 1.0;

/// Fixed classifier-free guidance weight (prompt adherence).
const CLASSIFIER_FREE_GUIDANCE: u32 = 3;

/// Interval between prediction status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Gives a 30s segment ten minutes to render before giving up.
const MAX_POLLS: u32 = 300;

const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

/// HTTP client for the Replicate predictions API.
pub struct ReplicateClient {
    client: reqwest::blocking::Client,
    api_token: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreatePrediction {
    version: &'static str,
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    input_audio: String,
    duration: u32,
    continuation: bool,
    /// Window of the reference to continue from, sent only on continuation
    /// calls. 0 to -1 means the whole reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation_start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation_end: Option<i32>,
    temperature: f32,
    classifier_free_guidance: u32,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }
}

impl ReplicateClient {
    /// Creates a client for the given API token.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                PipelineError::new(
                    ErrorCode::SegmentSynthesisFailed,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the service base URL (used to point at a local stand-in).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn create_prediction(&self, input: PredictionInput) -> Result<Prediction> {
        let url = format!("{}/v1/predictions", self.base_url);
        let body = CreatePrediction {
            version: MUSICGEN_VERSION,
            input,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_token))
            .json(&body)
            .send()
            .map_err(|e| {
                PipelineError::new(
                    ErrorCode::SegmentSynthesisFailed,
                    format!("synthesis request failed: {}", e),
                )
            })?;

        if !response.status().is_success() {
            return Err(PipelineError::new(
                ErrorCode::SegmentSynthesisFailed,
                format!("synthesis service returned HTTP {}", response.status()),
            ));
        }

        response.json().map_err(|e| {
            PipelineError::new(
                ErrorCode::SegmentSynthesisFailed,
                format!("malformed prediction response: {}", e),
            )
        })
    }

    fn poll_prediction(&self, id: &str) -> Result<Prediction> {
        let url = format!("{}/v1/predictions/{}", self.base_url, id);

        for _ in 0..MAX_POLLS {
            let response = self
                .client
                .get(&url)
                .header("Authorization", format!("Token {}", self.api_token))
                .send()
                .map_err(|e| {
                    PipelineError::new(
                        ErrorCode::SegmentSynthesisFailed,
                        format!("prediction poll failed: {}", e),
                    )
                })?;

            if !response.status().is_success() {
                return Err(PipelineError::new(
                    ErrorCode::SegmentSynthesisFailed,
                    format!("prediction poll returned HTTP {}", response.status()),
                ));
            }

            let prediction: Prediction = response.json().map_err(|e| {
                PipelineError::new(
                    ErrorCode::SegmentSynthesisFailed,
                    format!("malformed prediction response: {}", e),
                )
            })?;

            if prediction.is_terminal() {
                return Ok(prediction);
            }

            thread::sleep(POLL_INTERVAL);
        }

        Err(PipelineError::new(
            ErrorCode::SegmentSynthesisFailed,
            format!("prediction {} did not finish in time", id),
        ))
    }
}

impl SegmentSynthesizer for ReplicateClient {
    fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String> {
        let audio_bytes = fs::read(request.reference_audio).map_err(|e| {
            PipelineError::new(
                ErrorCode::SegmentSynthesisFailed,
                format!(
                    "reference audio not readable at {}: {}",
                    request.reference_audio.display(),
                    e
                ),
            )
        })?;

        let input = PredictionInput {
            prompt: request.prompt.to_string(),
            input_audio: encode_data_uri(&audio_bytes),
            duration: request.duration_sec,
            continuation: request.continuation,
            continuation_start: request.continuation.then_some(0),
            continuation_end: request.continuation.then_some(-1),
            temperature: TEMPERATURE,
            classifier_free_guidance: CLASSIFIER_FREE_GUIDANCE,
        };

        let mut prediction = self.create_prediction(input)?;
        if !prediction.is_terminal() {
            prediction = self.poll_prediction(&prediction.id)?;
        }

        if prediction.status != "succeeded" {
            let reason = prediction
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("status {}", prediction.status));
            return Err(PipelineError::new(
                ErrorCode::SegmentSynthesisFailed,
                format!("synthesis did not succeed: {}", reason),
            ));
        }

        extract_output_url(prediction.output.as_ref())
    }
}

/// Wraps raw audio bytes in a base64 `data:` URI the API accepts in place
/// of a hosted file.
fn encode_data_uri(bytes: &[u8]) -> String {
    format!("data:audio/wav;base64,{}", BASE64.encode(bytes))
}

/// Pulls the generated audio URL out of a prediction's `output` field,
/// which the model returns as either a single URL or a one-element array.
fn extract_output_url(output: Option<&serde_json::Value>) -> Result<String> {
    let url = match output {
        Some(serde_json::Value::String(url)) => Some(url.clone()),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    };

    url.filter(|u| !u.is_empty()).ok_or_else(|| {
        PipelineError::new(
            ErrorCode::SegmentSynthesisFailed,
            "prediction succeeded but returned no output URL",
        )
    })
}
