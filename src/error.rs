//! Error types for the pulse-daemon.
//!
//! Defines all error codes and types used throughout the pipeline for
//! consistent error handling and reporting.

use std::fmt;

/// Error codes returned by the pipeline in failure responses.
///
/// These codes are surfaced to the caller (the surrounding transport layer)
/// and allow it to programmatically map failures to user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Language model call failed or returned no usable song structure.
    /// Trigger: Network error, service error, or empty/invalid structure.
    StructureUnavailable,

    /// Audio synthesis call failed for a segment.
    /// Trigger: Service error, or the reference recording is missing.
    SegmentSynthesisFailed,

    /// Failed to download a generated segment from its remote location.
    /// Trigger: Transport error or non-success HTTP status.
    ArtifactFetchFailed,

    /// Failed to decode, merge, or export audio during stitching.
    /// Trigger: Corrupt segment, mismatched formats, or write failure.
    StitchFailed,

    /// Request inputs are invalid.
    /// Trigger: Empty recording or empty synthesis prompt.
    InvalidRequest,

    /// Filesystem operation on request storage failed.
    /// Trigger: Cannot create, write, or delete files under storage paths.
    StorageFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::StructureUnavailable => "STRUCTURE_UNAVAILABLE",
            ErrorCode::SegmentSynthesisFailed => "SEGMENT_SYNTHESIS_FAILED",
            ErrorCode::ArtifactFetchFailed => "ARTIFACT_FETCH_FAILED",
            ErrorCode::StitchFailed => "STITCH_FAILED",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::StorageFailed => "STORAGE_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::StructureUnavailable => {
                "Language model did not produce a usable song structure"
            }
            ErrorCode::SegmentSynthesisFailed => "Audio synthesis failed for a segment",
            ErrorCode::ArtifactFetchFailed => "Failed to download a generated segment",
            ErrorCode::StitchFailed => "Failed to stitch segments into a song",
            ErrorCode::InvalidRequest => "Request inputs are invalid",
            ErrorCode::StorageFailed => "Filesystem operation on request storage failed",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::StructureUnavailable => {
                "Check GEMINI_API_KEY and network connectivity, then retry the request. \
                 The whole request is retryable; no partial state is kept"
            }
            ErrorCode::SegmentSynthesisFailed => {
                "Check REPLICATE_API_TOKEN and service status, then retry the request. \
                 All partial artifacts have been removed"
            }
            ErrorCode::ArtifactFetchFailed => {
                "Check network connectivity and disk space, then retry the request"
            }
            ErrorCode::StitchFailed => {
                "Retry the request; if it persists, the synthesis service may be \
                 returning audio in an unexpected format"
            }
            ErrorCode::InvalidRequest => {
                "Provide a non-empty hum recording; description and vibe fall back \
                 to generic defaults when absent"
            }
            ErrorCode::StorageFailed => {
                "Check that the upload and generated directories exist and are \
                 writable (PULSE_UPLOAD_PATH, PULSE_GENERATED_PATH)"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for pipeline operations.
#[derive(Debug)]
pub struct PipelineError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PipelineError {
    /// Creates a new PipelineError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new PipelineError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a STRUCTURE_UNAVAILABLE error.
    pub fn structure_unavailable(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::StructureUnavailable,
            format!("Failed to generate song structure: {}", reason.into()),
        )
    }

    /// Creates a SEGMENT_SYNTHESIS_FAILED error naming the 1-based segment.
    pub fn synthesis_failed(segment: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SegmentSynthesisFailed,
            format!(
                "Failed to generate audio for segment {}: {}",
                segment,
                reason.into()
            ),
        )
    }

    /// Creates an ARTIFACT_FETCH_FAILED error naming the 1-based segment.
    pub fn fetch_failed(segment: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ArtifactFetchFailed,
            format!(
                "Failed to download generated audio for segment {}: {}",
                segment,
                reason.into()
            ),
        )
    }

    /// Creates a STITCH_FAILED error.
    pub fn stitch_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::StitchFailed,
            format!("Failed to stitch segments: {}", reason.into()),
        )
    }

    /// Creates an INVALID_REQUEST error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, reason.into())
    }

    /// Creates a STORAGE_FAILED error.
    pub fn storage_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::StorageFailed,
            format!("Storage operation failed: {}", reason.into()),
        )
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;
