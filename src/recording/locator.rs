use super::probe::MediaProbe;
use crate::store::{keys, SharedStateStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Recordings smaller than this are assumed to be truncated or empty
pub const DEFAULT_MIN_RECORDING_BYTES: u64 = 10 * 1024;

/// A recording that existed and passed the size check when resolved
///
/// No lock is held on the file; a concurrent delete by another actor
/// remains possible, and a later missing-file error on consumption
/// should be treated as already handled.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Why the last recording could not be resolved. All variants are
/// non-fatal and safe to retry.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Shared state unavailable: {0}")]
    StoreUnavailable(String),

    #[error("No recording has been produced yet")]
    NotFound,

    #[error("Recording pointer is stale, file missing: {path}")]
    FileMissing { path: PathBuf },

    #[error("Recording too small to be playable: {size_bytes} bytes")]
    TooSmall { path: PathBuf, size_bytes: u64 },
}

/// Locates and validates the file the recorder last produced
pub struct RecordingLocator {
    store: Arc<dyn SharedStateStore>,
    probe: Arc<dyn MediaProbe>,
    min_bytes: u64,
}

impl RecordingLocator {
    pub fn new(store: Arc<dyn SharedStateStore>, probe: Arc<dyn MediaProbe>) -> Self {
        Self {
            store,
            probe,
            min_bytes: DEFAULT_MIN_RECORDING_BYTES,
        }
    }

    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// Resolve the recording the shared-state pointer currently names
    ///
    /// Existence and size are checked synchronously; media integrity
    /// (duration, video track count) runs as a detached diagnostic task
    /// whose outcome is only ever logged. The returned recording is the
    /// path value captured at call time, so a concurrent overwrite of
    /// the pointer does not affect an in-flight resolution.
    pub fn resolve_last_recording(&self) -> Result<Recording, ResolveError> {
        let pointer = self
            .store
            .get(keys::LAST_RECORDING_PATH)
            .map_err(|e| ResolveError::StoreUnavailable(e.to_string()))?;

        let path = match pointer.and_then(|v| v.as_text().map(PathBuf::from)) {
            Some(path) => path,
            None => return Err(ResolveError::NotFound),
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(_) => {
                warn!(
                    "Recording pointer names a file that no longer exists: {}",
                    path.display()
                );
                return Err(ResolveError::FileMissing { path });
            }
        };

        let size_bytes = metadata.len();
        if size_bytes < self.min_bytes {
            warn!(
                "Recording at {} is only {} bytes (minimum {})",
                path.display(),
                size_bytes,
                self.min_bytes
            );
            return Err(ResolveError::TooSmall { path, size_bytes });
        }

        self.spawn_integrity_check(path.clone());

        Ok(Recording { path, size_bytes })
    }

    /// Fire-and-forget media inspection; the caller never waits on it
    fn spawn_integrity_check(&self, path: PathBuf) {
        let probe = Arc::clone(&self.probe);

        tokio::spawn(async move {
            match probe.probe(&path).await {
                Ok(media_info) if media_info.is_playable() => {
                    info!(
                        "Recording {} is valid ({:.1}s, {} video track(s))",
                        path.display(),
                        media_info.duration_secs,
                        media_info.video_tracks
                    );
                }
                Ok(media_info) => {
                    warn!(
                        "Recording {} may not be playable: {:.1}s duration, {} video track(s)",
                        path.display(),
                        media_info.duration_secs,
                        media_info.video_tracks
                    );
                }
                Err(e) => {
                    warn!("Media inspection failed for {}: {}", path.display(), e);
                }
            }
        });
    }
}
