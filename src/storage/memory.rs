use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::{
    domain::Transaction,
    errors::{Result, TrackerError},
};

use super::{encode_snapshot, LoadReport, SnapshotStorage};

/// In-memory storage slot. Clones share the same slot, so a test can keep a
/// handle and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot pre-filled with raw content.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// Returns the raw blob currently held in the slot.
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> Result<LoadReport> {
        let raw = self.raw();
        Ok(LoadReport::from_raw(raw.as_deref(), &self.describe()))
    }

    fn save(&self, transactions: &[Transaction], updated_at: DateTime<Utc>) -> Result<()> {
        let blob = encode_snapshot(transactions, updated_at)?;
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| TrackerError::Storage("memory slot lock poisoned".into()))?;
        *guard = Some(blob);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory slot".to_string()
    }
}
