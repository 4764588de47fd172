use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{SharedStateStore, StateValue};

/// Directory-backed shared state
///
/// One JSON file per key under a root directory visible to both the
/// host and the recorder process. A write lands in a uniquely-named
/// temp file first and is then renamed over the key file, so each
/// single-key write is atomic; nothing is atomic across keys.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl SharedStateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<StateValue>> {
        let path = self.key_path(key);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read store key: {}", key))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // A torn or foreign file under a key is treated as absent,
                // matching last-writer-wins semantics.
                warn!("Ignoring unparseable store entry for key {}: {}", key, e);
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: StateValue) -> Result<()> {
        let path = self.key_path(key);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4()));

        let raw = serde_json::to_string(&value).context("Failed to serialize store value")?;

        fs::write(&tmp, raw)
            .with_context(|| format!("Failed to write temp file for key: {}", key))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to commit store key: {}", key))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove store key: {}", key)),
        }
    }
}
