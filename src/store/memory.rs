use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{SharedStateStore, StateValue};

/// In-process shared state, for tests and single-process wiring
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StateValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SharedStateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<StateValue>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: StateValue) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
