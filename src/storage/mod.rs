pub mod json_backend;
pub mod memory;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::Transaction,
    errors::{Result, TrackerError},
};

pub use json_backend::JsonSnapshotStorage;
pub use memory::MemoryStorage;

/// Version tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Default name of the single storage slot holding the snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "financeTransactions";

/// Abstraction over the single-slot key-value store that holds the snapshot.
pub trait SnapshotStorage: Send + Sync {
    /// Reads the snapshot. A missing slot yields an empty report; malformed
    /// content yields an empty report carrying a warning.
    fn load(&self) -> Result<LoadReport>;

    /// Replaces the stored snapshot with `transactions`.
    fn save(&self, transactions: &[Transaction], updated_at: DateTime<Utc>) -> Result<()>;

    /// Human readable location of the slot.
    fn describe(&self) -> String;

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        Ok(Vec::new())
    }

    /// Reads a backup without touching the live snapshot.
    fn read_backup(&self, backup_id: &str) -> Result<LoadReport> {
        Err(TrackerError::Storage(format!(
            "backup `{backup_id}` not found: {} keeps no backups",
            self.describe()
        )))
    }
}

/// Owned form of the persisted blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default = "Snapshot::default_version")]
    pub version: String,
}

impl Snapshot {
    fn default_version() -> String {
        SNAPSHOT_VERSION.to_string()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    transactions: &'a [Transaction],
    last_updated: DateTime<Utc>,
    version: &'static str,
}

/// Serializes the snapshot blob for `transactions`.
pub fn encode_snapshot(transactions: &[Transaction], updated_at: DateTime<Utc>) -> Result<String> {
    let blob = SnapshotRef {
        transactions,
        last_updated: updated_at,
        version: SNAPSHOT_VERSION,
    };
    Ok(serde_json::to_string_pretty(&blob)?)
}

/// Outcome of reading the storage slot.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub transactions: Vec<Transaction>,
    pub last_updated: Option<DateTime<Utc>>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    /// Decodes raw slot content, falling back to an empty list on malformed input.
    pub fn from_raw(raw: Option<&str>, source: &str) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Snapshot>(raw) {
            Ok(snapshot) => {
                let mut warnings = Vec::new();
                if snapshot.version != SNAPSHOT_VERSION {
                    warnings.push(format!(
                        "{source} was written with snapshot version {}; reading as {}",
                        snapshot.version, SNAPSHOT_VERSION
                    ));
                }
                Self {
                    transactions: snapshot.transactions,
                    last_updated: snapshot.last_updated,
                    warnings,
                }
            }
            Err(err) => {
                tracing::warn!(%source, error = %err, "discarding malformed snapshot");
                Self {
                    warnings: vec![format!(
                        "could not read {source} ({err}); starting with an empty list"
                    )],
                    ..Self::default()
                }
            }
        }
    }
}

/// Describes a stored backup of a previous snapshot.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}
