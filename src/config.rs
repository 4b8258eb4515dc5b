//! Pipeline configuration module.
//!
//! Contains the runtime configuration for the pulse-daemon, including
//! service credentials, storage paths, and generation parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Maximum segment duration the synthesis service accepts, in seconds.
pub const MAX_SEGMENT_DURATION_SEC: u32 = 30;

/// Default per-segment duration, in seconds.
pub const DEFAULT_SEGMENT_DURATION_SEC: u32 = 15;

/// Default crossfade window used when stitching segments, in milliseconds.
pub const DEFAULT_CROSSFADE_MS: u32 = 150;

/// Which recording is passed as the melodic reference for each segment.
///
/// The deployed behavior anchors every segment to the original hum; chaining
/// from the previously generated segment is a plausible alternative the
/// orchestrator supports without restructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Every segment uses the original uploaded hum as its reference.
    #[default]
    OriginalHum,

    /// Segments after the first use the previously fetched segment.
    PreviousSegment,
}

impl ReferenceSource {
    /// Returns the string representation of the reference source.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceSource::OriginalHum => "original_hum",
            ReferenceSource::PreviousSegment => "previous_segment",
        }
    }

    /// Parses a reference source from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "original_hum" | "hum" => Some(ReferenceSource::OriginalHum),
            "previous_segment" | "previous" => Some(ReferenceSource::PreviousSegment),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime configuration for the pipeline.
///
/// This configuration is typically loaded from environment variables at
/// startup and validated once when the pipeline is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// API key for the language-model service (song structure generation).
    pub gemini_api_key: String,

    /// API token for the audio-generation service (segment synthesis).
    pub replicate_api_token: String,

    /// Directory for uploaded hum recordings.
    /// If None, uses the platform-specific default cache location.
    pub upload_path: Option<PathBuf>,

    /// Directory for generated segments and stitched songs.
    /// If None, uses the platform-specific default cache location.
    pub generated_path: Option<PathBuf>,

    /// Duration of each synthesized segment in seconds (5-30).
    pub segment_duration_sec: u32,

    /// Crossfade window applied between adjacent segments, in milliseconds.
    pub crossfade_ms: u32,

    /// Which recording anchors each segment's synthesis call.
    pub reference_source: ReferenceSource,
}

impl PipelineConfig {
    /// Creates a configuration with the given credentials and defaults
    /// for everything else.
    pub fn new(gemini_api_key: impl Into<String>, replicate_api_token: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            replicate_api_token: replicate_api_token.into(),
            upload_path: None,
            generated_path: None,
            segment_duration_sec: DEFAULT_SEGMENT_DURATION_SEC,
            crossfade_ms: DEFAULT_CROSSFADE_MS,
            reference_source: ReferenceSource::default(),
        }
    }

    /// Creates a PipelineConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `GEMINI_API_KEY` - Language model credentials (required)
    /// - `REPLICATE_API_TOKEN` - Synthesis service credentials (required)
    /// - `PULSE_UPLOAD_PATH` - Directory for uploaded recordings
    /// - `PULSE_GENERATED_PATH` - Directory for generated audio
    /// - `PULSE_SEGMENT_DURATION` - Per-segment duration in seconds
    /// - `PULSE_CROSSFADE_MS` - Crossfade window in milliseconds
    /// - `PULSE_REFERENCE` - Reference source (original_hum, previous_segment)
    ///
    /// Missing credentials are reported by `validate`, not here, so the
    /// caller gets one fail-fast construction point.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            std::env::var("REPLICATE_API_TOKEN").unwrap_or_default(),
        );

        if let Ok(path) = std::env::var("PULSE_UPLOAD_PATH") {
            config.upload_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("PULSE_GENERATED_PATH") {
            config.generated_path = Some(PathBuf::from(path));
        }

        if let Ok(duration_str) = std::env::var("PULSE_SEGMENT_DURATION") {
            if let Ok(duration) = duration_str.parse::<u32>() {
                if duration > 0 {
                    config.segment_duration_sec = duration;
                }
            }
        }

        if let Ok(crossfade_str) = std::env::var("PULSE_CROSSFADE_MS") {
            if let Ok(crossfade) = crossfade_str.parse::<u32>() {
                config.crossfade_ms = crossfade;
            }
        }

        if let Ok(reference_str) = std::env::var("PULSE_REFERENCE") {
            if let Some(reference) = ReferenceSource::parse(&reference_str) {
                config.reference_source = reference;
            }
        }

        config
    }

    /// Returns the effective upload path, using platform defaults if not
    /// specified.
    pub fn effective_upload_path(&self) -> PathBuf {
        if let Some(ref path) = self.upload_path {
            path.clone()
        } else {
            default_storage_path().join("uploads")
        }
    }

    /// Returns the effective generated-audio path, using platform defaults
    /// if not specified.
    pub fn effective_generated_path(&self) -> PathBuf {
        if let Some(ref path) = self.generated_path {
            path.clone()
        } else {
            default_storage_path().join("generated")
        }
    }

    /// Validates the configuration.
    ///
    /// Construction of the pipeline fails closed on the first error so no
    /// component is ever left half-initialized.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::MissingGeminiKey);
        }
        if self.replicate_api_token.trim().is_empty() {
            return Err(ConfigError::MissingReplicateToken);
        }
        if self.segment_duration_sec == 0 || self.segment_duration_sec > MAX_SEGMENT_DURATION_SEC {
            return Err(ConfigError::InvalidSegmentDuration(self.segment_duration_sec));
        }
        // Crossfade must leave audible material in every segment
        if self.crossfade_ms >= self.segment_duration_sec * 1000 {
            return Err(ConfigError::InvalidCrossfade(self.crossfade_ms));
        }
        Ok(())
    }
}

/// Error produced when pipeline configuration is invalid at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// GEMINI_API_KEY is unset or empty.
    MissingGeminiKey,
    /// REPLICATE_API_TOKEN is unset or empty.
    MissingReplicateToken,
    /// Segment duration outside the 1-30 second range.
    InvalidSegmentDuration(u32),
    /// Crossfade window does not fit inside a segment.
    InvalidCrossfade(u32),
    /// A pipeline component could not be constructed (storage directories,
    /// HTTP clients). Construction fails closed; nothing is left
    /// half-initialized.
    ComponentInit(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingGeminiKey => {
                write!(
                    f,
                    "GEMINI_API_KEY environment variable not set. \
                     Add it to the environment before starting the pipeline"
                )
            }
            ConfigError::MissingReplicateToken => {
                write!(
                    f,
                    "REPLICATE_API_TOKEN environment variable not set. \
                     Add it to the environment before starting the pipeline"
                )
            }
            ConfigError::InvalidSegmentDuration(d) => {
                write!(
                    f,
                    "Invalid segment duration: {} seconds (must be 1-{})",
                    d, MAX_SEGMENT_DURATION_SEC
                )
            }
            ConfigError::InvalidCrossfade(ms) => {
                write!(
                    f,
                    "Invalid crossfade: {} ms (must be shorter than a segment)",
                    ms
                )
            }
            ConfigError::ComponentInit(reason) => {
                write!(f, "Failed to initialize pipeline component: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Returns the platform-specific default storage root.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/pulse-daemon
/// - Linux: ~/.cache/pulse-daemon
/// - Windows: C:\Users\<user>\AppData\Local\pulse-daemon\cache
fn default_storage_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pulse-daemon") {
        proj_dirs.cache_dir().to_path_buf()
    } else {
        // Fallback to current directory
        PathBuf::from("./storage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PipelineConfig {
        PipelineConfig::new("gemini-key", "replicate-token")
    }

    #[test]
    fn reference_source_parsing() {
        assert_eq!(
            ReferenceSource::parse("original_hum"),
            Some(ReferenceSource::OriginalHum)
        );
        assert_eq!(
            ReferenceSource::parse("HUM"),
            Some(ReferenceSource::OriginalHum)
        );
        assert_eq!(
            ReferenceSource::parse("previous_segment"),
            Some(ReferenceSource::PreviousSegment)
        );
        assert_eq!(ReferenceSource::parse("invalid"), None);
    }

    #[test]
    fn reference_source_display() {
        assert_eq!(ReferenceSource::OriginalHum.to_string(), "original_hum");
        assert_eq!(
            ReferenceSource::PreviousSegment.to_string(),
            "previous_segment"
        );
    }

    #[test]
    fn config_defaults() {
        let config = valid_config();
        assert_eq!(config.segment_duration_sec, DEFAULT_SEGMENT_DURATION_SEC);
        assert_eq!(config.crossfade_ms, DEFAULT_CROSSFADE_MS);
        assert_eq!(config.reference_source, ReferenceSource::OriginalHum);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_requires_credentials() {
        let mut config = valid_config();
        config.gemini_api_key = String::new();
        assert_eq!(config.validate(), Err(ConfigError::MissingGeminiKey));

        let mut config = valid_config();
        config.replicate_api_token = "   ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingReplicateToken));
    }

    #[test]
    fn validation_bounds_duration() {
        let mut config = valid_config();
        config.segment_duration_sec = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSegmentDuration(0))
        ));

        config.segment_duration_sec = 45;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSegmentDuration(45))
        ));

        config.segment_duration_sec = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_bounds_crossfade() {
        let mut config = valid_config();
        config.segment_duration_sec = 5;
        config.crossfade_ms = 5000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCrossfade(5000))
        ));
    }

    #[test]
    fn effective_paths_non_empty() {
        let config = valid_config();
        assert!(!config.effective_upload_path().as_os_str().is_empty());
        assert!(!config.effective_generated_path().as_os_str().is_empty());
    }
}
