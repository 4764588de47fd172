mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys shared between the host and the external recorder process.
///
/// Each key has exactly one writer role in normal operation:
/// the recorder owns `session-start-time` and `last-recording-path`,
/// the host owns `pairing-code` and `stream-quality`.
pub mod keys {
    /// Presence of this key means a broadcast session is active.
    pub const SESSION_START_TIME: &str = "session-start-time";
    /// 4-digit zero-padded pairing code, issued by the host.
    pub const PAIRING_CODE: &str = "pairing-code";
    /// Requested capture quality, read by the recorder at session start.
    pub const STREAM_QUALITY: &str = "stream-quality";
    /// Path of the finished media file written by the recorder.
    pub const LAST_RECORDING_PATH: &str = "last-recording-path";
}

/// A value stored under a shared-state key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    /// A point in time (e.g. session start)
    Timestamp(DateTime<Utc>),
    /// An opaque string (pairing code, quality, file path)
    Text(String),
}

impl StateValue {
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            StateValue::Timestamp(ts) => Some(*ts),
            StateValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            StateValue::Timestamp(_) => None,
        }
    }
}

/// Cross-process shared key-value state
///
/// Both the host and the recorder read and write this store. Every
/// operation touches exactly one key and is last-writer-wins; there are
/// no transactions across keys, so readers must tolerate observing a
/// partially-updated set of keys (e.g. a fresh start time next to a
/// pairing code left over from the previous session).
pub trait SharedStateStore: Send + Sync {
    /// Read a single key. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<StateValue>>;

    /// Write a single key, overwriting any prior value.
    fn set(&self, key: &str, value: StateValue) -> Result<()>;

    /// Remove a single key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
