use crate::recording::Recording;
use crate::store::{keys, SharedStateStore};
use anyhow::Result;
use std::fs;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a handoff operation failed. Both variants leave the shared-state
/// pointer in place so the operation can be retried.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("Failed to delete recording: {0}")]
    DeleteFailed(String),

    #[error("Consumer rejected recording: {0}")]
    SendFailed(String),
}

/// External consumer of a finished recording (e.g. a network upload)
///
/// Retry policy belongs to the implementation, not to the pipeline.
#[async_trait::async_trait]
pub trait RecordingConsumer: Send + Sync {
    async fn consume(&self, recording: &Recording) -> Result<()>;
}

/// Disposes of a validated recording: either deletes it or hands it to
/// a consumer, clearing the shared-state pointer once the file no
/// longer needs tracking.
///
/// Delete and send both clear the same pointer; callers must serialize
/// the two per recording, the pipeline does not enforce mutual
/// exclusion between concurrent calls.
pub struct HandoffPipeline {
    store: Arc<dyn SharedStateStore>,
    consumer: Arc<dyn RecordingConsumer>,
}

impl HandoffPipeline {
    pub fn new(store: Arc<dyn SharedStateStore>, consumer: Arc<dyn RecordingConsumer>) -> Self {
        Self { store, consumer }
    }

    /// Delete the recording from disk and clear the pointer
    ///
    /// On failure the pointer is left untouched so a retry can be
    /// attempted.
    pub fn delete(&self, recording: &Recording) -> Result<(), HandoffError> {
        if let Err(e) = fs::remove_file(&recording.path) {
            error!(
                "Failed to delete recording {}: {}",
                recording.path.display(),
                e
            );
            return Err(HandoffError::DeleteFailed(e.to_string()));
        }

        info!("Deleted recording: {}", recording.path.display());
        self.clear_pointer();
        Ok(())
    }

    /// Hand the recording to the consumer and report through `completion`
    ///
    /// The completion callback is invoked exactly once with a success
    /// flag. The pointer is cleared only on success; no retry happens at
    /// this layer.
    pub async fn send(&self, recording: Recording, completion: impl FnOnce(bool) + Send) {
        match self.consumer.consume(&recording).await {
            Ok(()) => {
                info!("Recording sent: {}", recording.path.display());
                self.clear_pointer();
                completion(true);
            }
            Err(e) => {
                error!(
                    "Failed to send recording {}: {}",
                    recording.path.display(),
                    e
                );
                completion(false);
            }
        }
    }

    /// The pointer must not outlive the file it names once consumed. A
    /// store error here is logged but does not turn the handoff into a
    /// failure; the stale pointer resolves as FileMissing later.
    fn clear_pointer(&self) {
        if let Err(e) = self.store.remove(keys::LAST_RECORDING_PATH) {
            warn!("Failed to clear recording pointer: {}", e);
        }
    }
}
