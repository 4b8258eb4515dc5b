//! GenerationRequest type representing one submitted hum-to-song request.
//!
//! A request is created when the caller submits a recording plus textual
//! descriptions, and is immutable for its whole lifetime. It owns the
//! uploaded recording on disk until the pipeline delivers or aborts.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default melody description when the caller supplies none.
pub const DEFAULT_HUM_DESCRIPTION: &str = "a user-provided hummed melody";

/// Default vibe description when the caller supplies none.
pub const DEFAULT_VIBE: &str = "an interesting and cool vibe";

/// One submitted hum-to-song request.
///
/// All files belonging to a request are namespaced by `request_id`, so
/// concurrent requests never collide on the filesystem.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Unique request identifier. Format: 16 hex characters.
    pub request_id: String,

    /// Path to the uploaded hum recording, saved at request arrival.
    pub hum_path: PathBuf,

    /// Textual description of the hummed melody.
    pub melody_description: String,

    /// Desired style or vibe for the song.
    pub vibe: String,

    /// When the request was received.
    pub created_at: SystemTime,
}

impl GenerationRequest {
    /// Creates a new request, substituting generic defaults for absent
    /// descriptions.
    pub fn new(
        request_id: String,
        hum_path: PathBuf,
        melody_description: Option<String>,
        vibe: Option<String>,
    ) -> Self {
        let melody_description = melody_description
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HUM_DESCRIPTION.to_string());
        let vibe = vibe
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VIBE.to_string());

        Self {
            request_id,
            hum_path,
            melody_description,
            vibe,
            created_at: SystemTime::now(),
        }
    }

    /// Validates that the request's recording exists on disk.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.request_id.len() != 16 || !self.request_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(format!("Malformed request id: {:?}", self.request_id));
        }
        if !self.hum_path.exists() {
            return Some(format!(
                "Hum recording does not exist: {}",
                self.hum_path.display()
            ));
        }
        None
    }
}

/// Monotonic counter mixed into request ids so two requests arriving in the
/// same clock tick still get distinct ids.
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a unique request identifier.
///
/// The id is the first 16 hex characters of the SHA256 hash of the arrival
/// time and a process-wide counter. Ids partition the filesystem namespace:
/// `{id}_hum.wav`, `{id}_segment_{n}.wav`, `final_song_{id}.wav`.
pub fn generate_request_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let count = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);

    let input = format!("{}:{}:{}", now.as_secs(), now.subsec_nanos(), count);
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    // Take first 8 bytes (16 hex chars)
    hex::encode(&result[..8])
}
