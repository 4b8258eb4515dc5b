//! Artifact retrieval from the synthesis service's output store.
//!
//! Streams a generated segment from its remote URL into request-scoped
//! local storage with a bounded buffer.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::{ErrorCode, PipelineError, Result};

/// Retrieves a generated segment's audio bytes into local storage.
///
/// Production uses [`HttpFetcher`]; tests substitute a fake.
pub trait ArtifactFetcher {
    /// Downloads `url` into `dest`. On failure no partial file remains.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP implementation of [`ArtifactFetcher`] with chunked streaming.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a download-appropriate timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| {
                PipelineError::with_source(
                    ErrorCode::ArtifactFetchFailed,
                    "Failed to create HTTP client",
                    e,
                )
            })?;
        Ok(Self { client })
    }

    fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().map_err(|e| {
            PipelineError::new(
                ErrorCode::ArtifactFetchFailed,
                format!("Failed to download {}: {}", url, e),
            )
        })?;

        if !response.status().is_success() {
            return Err(PipelineError::new(
                ErrorCode::ArtifactFetchFailed,
                format!("HTTP {} for {}", response.status(), url),
            ));
        }

        let mut file = fs::File::create(dest).map_err(|e| {
            PipelineError::new(
                ErrorCode::ArtifactFetchFailed,
                format!("Failed to create file {}: {}", dest.display(), e),
            )
        })?;

        // Stream the download in bounded chunks
        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 65536];

        loop {
            let bytes_read = response.read(&mut buffer).map_err(|e| {
                PipelineError::new(
                    ErrorCode::ArtifactFetchFailed,
                    format!("Failed to read response from {}: {}", url, e),
                )
            })?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read]).map_err(|e| {
                PipelineError::new(
                    ErrorCode::ArtifactFetchFailed,
                    format!("Failed to write {}: {}", dest.display(), e),
                )
            })?;

            downloaded += bytes_read as u64;
        }

        Ok(downloaded)
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        match self.stream_to_file(url, dest) {
            Ok(bytes) => {
                eprintln!(
                    "Downloaded {} ({:.1} KB)",
                    dest.display(),
                    bytes as f64 / 1024.0
                );
                Ok(())
            }
            Err(e) => {
                // A partially written file must not survive the failure
                let _ = fs::remove_file(dest);
                Err(e)
            }
        }
    }
}
