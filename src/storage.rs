//! Request-scoped file storage.
//!
//! Two logical namespaces back the pipeline: uploaded hum recordings and
//! generated audio (segments plus the stitched song). Every file name is
//! keyed by the request id, so concurrent requests never collide and no
//! locking is needed. Nothing persists beyond a single request's lifetime.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};

/// Filesystem store for one pipeline's uploads and generated audio.
#[derive(Debug, Clone)]
pub struct RequestStore {
    upload_dir: PathBuf,
    generated_dir: PathBuf,
}

impl RequestStore {
    /// Creates a store rooted at the given directories, creating them if
    /// they do not exist.
    pub fn new(upload_dir: impl Into<PathBuf>, generated_dir: impl Into<PathBuf>) -> Result<Self> {
        let upload_dir = upload_dir.into();
        let generated_dir = generated_dir.into();

        for dir in [&upload_dir, &generated_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                PipelineError::storage_failed(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            upload_dir,
            generated_dir,
        })
    }

    /// Creates a store from pipeline configuration, using platform default
    /// locations when paths are not configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(
            config.effective_upload_path(),
            config.effective_generated_path(),
        )
    }

    /// Saves an uploaded hum recording, returning its path.
    pub fn save_hum(&self, request_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.hum_path(request_id);
        let mut file = fs::File::create(&path).map_err(|e| {
            PipelineError::storage_failed(format!(
                "Failed to create {}: {}",
                path.display(),
                e
            ))
        })?;
        file.write_all(bytes).map_err(|e| {
            PipelineError::storage_failed(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Returns the path of a request's uploaded hum recording.
    pub fn hum_path(&self, request_id: &str) -> PathBuf {
        self.upload_dir.join(format!("{}_hum.wav", request_id))
    }

    /// Returns the path for a fetched segment. `index` is zero-based; file
    /// names carry the 1-based segment number.
    pub fn segment_path(&self, request_id: &str, index: usize) -> PathBuf {
        self.generated_dir
            .join(format!("{}_segment_{}.wav", request_id, index + 1))
    }

    /// Returns the path for a request's stitched song.
    pub fn stitched_path(&self, request_id: &str) -> PathBuf {
        self.generated_dir
            .join(format!("final_song_{}.wav", request_id))
    }

    /// Removes a file, treating a missing file as already removed.
    pub fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::storage_failed(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, RequestStore) {
        let dir = tempdir().unwrap();
        let store = RequestStore::new(dir.path().join("uploads"), dir.path().join("generated"))
            .unwrap();
        (dir, store)
    }

    #[test]
    fn new_creates_directories() {
        let (dir, _store) = store();
        assert!(dir.path().join("uploads").is_dir());
        assert!(dir.path().join("generated").is_dir());
    }

    #[test]
    fn save_hum_writes_bytes() {
        let (_dir, store) = store();
        let path = store.save_hum("abc123def4567890", b"RIFF").unwrap();
        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), b"RIFF");
        assert!(path.to_string_lossy().contains("abc123def4567890_hum.wav"));
    }

    #[test]
    fn paths_are_namespaced_by_request() {
        let (_dir, store) = store();
        let a = store.segment_path("aaaa", 0);
        let b = store.segment_path("bbbb", 0);
        assert_ne!(a, b);

        // Segment file names are 1-based
        assert!(a.to_string_lossy().ends_with("aaaa_segment_1.wav"));
        assert!(store
            .segment_path("aaaa", 3)
            .to_string_lossy()
            .ends_with("aaaa_segment_4.wav"));
        assert!(store
            .stitched_path("aaaa")
            .to_string_lossy()
            .ends_with("final_song_aaaa.wav"));
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, store) = store();
        let path = store.save_hum("abc123def4567890", b"data").unwrap();

        store.remove(&path).unwrap();
        assert!(!path.exists());

        // Removing again is not an error
        store.remove(&path).unwrap();
    }
}
