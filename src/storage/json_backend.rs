use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{
    domain::Transaction,
    errors::{Result, TrackerError},
    utils::paths::ensure_dir,
};

use super::{encode_snapshot, BackupInfo, LoadReport, SnapshotStorage};

const SNAPSHOT_EXTENSION: &str = "json";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Stores the snapshot as `<data_dir>/<key>.json` and keeps rolling copies of
/// replaced content under `<data_dir>/backups/`.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStorage {
    path: PathBuf,
    backups_dir: PathBuf,
    stem: String,
    retention: usize,
}

impl JsonSnapshotStorage {
    pub fn new(data_dir: PathBuf, key: &str) -> Result<Self> {
        Self::with_retention(data_dir, key, DEFAULT_RETENTION)
    }

    pub fn with_retention(data_dir: PathBuf, key: &str, retention: usize) -> Result<Self> {
        ensure_dir(&data_dir)?;
        let stem = canonical_key(key);
        let backups_dir = data_dir.join(BACKUP_DIR);
        Ok(Self {
            path: data_dir.join(format!("{stem}.{SNAPSHOT_EXTENSION}")),
            backups_dir,
            stem,
            retention: retention.max(1),
        })
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Copies the live snapshot to `<stem>_<YYYYMMDD_HHMMSS_mmm>.json`, adding a
    /// `-N` suffix when that name is already taken.
    fn backup_existing(&self, now: DateTime<Utc>) -> Result<()> {
        ensure_dir(&self.backups_dir)?;
        let stamp = now.format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_name = format!("{}_{}.{}", self.stem, stamp, SNAPSHOT_EXTENSION);
        let mut sequence = 0u32;
        while self.backups_dir.join(&file_name).exists() {
            sequence += 1;
            file_name = format!(
                "{}_{}-{}.{}",
                self.stem, stamp, sequence, SNAPSHOT_EXTENSION
            );
        }
        fs::copy(&self.path, self.backups_dir.join(&file_name))?;
        tracing::debug!(backup = %file_name, "backed up previous snapshot");
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for entry in backups.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl SnapshotStorage for JsonSnapshotStorage {
    fn load(&self) -> Result<LoadReport> {
        let raw = self.read_raw()?;
        Ok(LoadReport::from_raw(raw.as_deref(), &self.describe()))
    }

    fn save(&self, transactions: &[Transaction], updated_at: DateTime<Utc>) -> Result<()> {
        let json = encode_snapshot(transactions, updated_at)?;
        // A rewrite that only refreshes the timestamp is not worth a backup.
        if let Some(existing) = self.read_raw()? {
            if !same_records(&existing, transactions) {
                self.backup_existing(updated_at)?;
            }
        }
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !file_name.starts_with(&format!("{}_", self.stem)) {
                continue;
            }
            let (created_at, sequence) = parse_backup_name(file_name).unzip();
            let size_bytes = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
            let info = BackupInfo {
                id: file_name.to_string(),
                created_at,
                size_bytes,
                path: path.clone(),
            };
            entries.push((info, sequence));
        }
        entries.sort_by_key(|(info, sequence)| Reverse((info.created_at, *sequence)));
        Ok(entries.into_iter().map(|(info, _)| info).collect())
    }

    fn read_backup(&self, backup_id: &str) -> Result<LoadReport> {
        let source = self.backups_dir.join(backup_id);
        if backup_id.contains(['/', '\\']) || !source.is_file() {
            return Err(TrackerError::Storage(format!(
                "backup `{backup_id}` not found"
            )));
        }
        let raw = fs::read_to_string(&source)?;
        let report = LoadReport::from_raw(Some(&raw), backup_id);
        if !report.warnings.is_empty() && report.transactions.is_empty() {
            return Err(TrackerError::Storage(format!(
                "backup `{backup_id}` is unreadable"
            )));
        }
        Ok(report)
    }
}

fn same_records(existing: &str, transactions: &[Transaction]) -> bool {
    let report = LoadReport::from_raw(Some(existing), "existing snapshot");
    report.warnings.is_empty() && report.transactions == transactions
}

/// Keeps ASCII alphanumerics, `-` and `_`; anything else becomes `_`.
fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "snapshot".into()
    } else {
        sanitized
    }
}

/// Parses `<stem>_<YYYYMMDD>_<HHMMSS>_<mmm>[-N].json` into the backup time and
/// its same-millisecond sequence number.
fn parse_backup_name(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", SNAPSHOT_EXTENSION))?;
    let mut segments = trimmed.rsplitn(4, '_');
    let last = segments.next()?;
    let (millis, sequence) = match last.split_once('-') {
        Some((millis, sequence)) => (millis, sequence.parse().ok()?),
        None => (last, 0),
    };
    let time = segments.next()?;
    let date = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 6) || !is_digits(millis, 3) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S").ok()?;
    let millis: i64 = millis.parse().ok()?;
    let created_at = DateTime::from_naive_utc_and_offset(naive, Utc) + Duration::milliseconds(millis);
    Some((created_at, sequence))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TransactionDraft, TransactionKind};
    use chrono::{Duration, NaiveDate, TimeZone};
    use tempfile::TempDir;

    fn storage_with_temp_dir(retention: usize) -> (JsonSnapshotStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonSnapshotStorage::with_retention(
            temp.path().to_path_buf(),
            "financeTransactions",
            retention,
        )
        .expect("json storage");
        (storage, temp)
    }

    fn record(id: u64, amount: i64) -> Transaction {
        TransactionDraft::new(TransactionKind::Income)
            .amount(amount.into())
            .category("Salario")
            .description("Nómina")
            .date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .validate()
            .unwrap()
            .into_transaction(id, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn missing_file_loads_empty() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let report = storage.load().expect("load");
        assert!(report.transactions.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let records = vec![record(1, 1000), record(2, 50)];
        storage.save(&records, Utc::now()).expect("save");
        let loaded = storage.load().expect("load");
        assert_eq!(loaded.transactions, records);
        assert!(storage
            .snapshot_path()
            .ends_with("financeTransactions.json"));
    }

    #[test]
    fn changed_content_is_backed_up_and_pruned() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut records = Vec::new();
        for step in 0..4u64 {
            records.push(record(step + 1, 10));
            storage
                .save(&records, start + Duration::seconds(step as i64))
                .expect("save");
        }
        let backups = storage.list_backups().expect("list backups");
        assert_eq!(backups.len(), 2, "retention keeps two backups");
        assert!(backups[0].created_at > backups[1].created_at);
    }

    #[test]
    fn unchanged_content_does_not_create_backups() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let records = vec![record(1, 10)];
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        storage.save(&records, start).unwrap();
        storage.save(&records, start + Duration::seconds(30)).unwrap();
        assert!(storage.list_backups().unwrap().is_empty());
    }

    #[test]
    fn read_backup_leaves_live_snapshot_alone() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        storage.save(&[record(1, 10)], start).unwrap();
        storage
            .save(&[record(1, 10), record(2, 20)], start + Duration::seconds(5))
            .unwrap();
        let backups = storage.list_backups().unwrap();
        let report = storage.read_backup(&backups[0].id).expect("read backup");
        assert_eq!(report.transactions.len(), 1);
        assert_eq!(storage.load().unwrap().transactions.len(), 2);
        assert!(storage.read_backup("missing.json").is_err());
        assert!(storage.read_backup("../financeTransactions.json").is_err());
    }

    #[test]
    fn saves_within_one_millisecond_keep_every_previous_version() {
        let (storage, _guard) = storage_with_temp_dir(5);
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        storage.save(&[record(1, 10)], at).unwrap();
        storage.save(&[record(1, 10), record(2, 20)], at).unwrap();
        storage.save(&[record(2, 20)], at).unwrap();

        let backups = storage.list_backups().unwrap();
        let ids: Vec<_> = backups.iter().map(|backup| backup.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "financeTransactions_20240301_080000_000-1.json",
                "financeTransactions_20240301_080000_000.json",
            ]
        );
        assert_eq!(
            storage.read_backup(ids[0]).unwrap().transactions.len(),
            2,
            "newest backup holds the second version"
        );
    }

    #[test]
    fn canonical_key_replaces_unsafe_characters() {
        assert_eq!(canonical_key("financeTransactions"), "financeTransactions");
        assert_eq!(canonical_key("../etc"), "___etc");
        assert_eq!(canonical_key("  "), "snapshot");
    }

    #[test]
    fn backup_names_parse_into_time_and_sequence() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 5).unwrap() + Duration::milliseconds(42);
        assert_eq!(
            parse_backup_name("financeTransactions_20240301_080005_042.json"),
            Some((at, 0))
        );
        assert_eq!(
            parse_backup_name("my_key_20240301_080005_042-3.json"),
            Some((at, 3))
        );
        assert_eq!(parse_backup_name("financeTransactions_20240301_080005.json"), None);
        assert_eq!(parse_backup_name("notes.json"), None);
    }
}
