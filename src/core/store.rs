use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    domain::{Transaction, TransactionDraft, TransactionId},
    errors::{Result, TrackerError},
    storage::SnapshotStorage,
};

use super::{autosave::AutosaveTimer, clock::Clock};

/// Default autosave interval applied by [`TransactionStore::open`].
pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;

/// Owns the transaction collection and keeps it synchronized with a storage slot.
///
/// Every mutation is persisted immediately. When the write fails the mutation
/// is undone, so the in-memory collection always matches the last snapshot
/// that was accepted by the storage backend.
pub struct TransactionStore {
    records: Vec<Transaction>,
    storage: Box<dyn SnapshotStorage>,
    clock: Box<dyn Clock>,
    autosave: AutosaveTimer,
    warnings: Vec<String>,
}

impl TransactionStore {
    /// Loads the collection from `storage`. Malformed snapshots and invalid
    /// records are skipped and reported through [`TransactionStore::load_warnings`].
    pub fn open(storage: Box<dyn SnapshotStorage>, clock: Box<dyn Clock>) -> Result<Self> {
        let report = storage.load()?;
        let mut warnings = report.warnings;
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(report.transactions.len());
        for record in report.transactions {
            if let Err(err) = record.check_invariants() {
                tracing::warn!(id = record.id, error = %err, "skipping invalid stored record");
                warnings.push(format!("skipped stored record: {err}"));
                continue;
            }
            if !seen.insert(record.id) {
                tracing::warn!(id = record.id, "skipping duplicate stored record");
                warnings.push(format!("skipped duplicate stored record {}", record.id));
                continue;
            }
            records.push(record);
        }
        tracing::info!(
            count = records.len(),
            source = %storage.describe(),
            "loaded transactions"
        );
        let autosave = AutosaveTimer::new(DEFAULT_AUTOSAVE_SECS, clock.now());
        Ok(Self {
            records,
            storage,
            clock,
            autosave,
            warnings,
        })
    }

    pub fn with_autosave_interval(mut self, interval_secs: u64) -> Self {
        self.autosave = AutosaveTimer::new(interval_secs, self.clock.now());
        self
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Records in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn storage(&self) -> &dyn SnapshotStorage {
        self.storage.as_ref()
    }

    /// Validates `draft`, assigns an id and creation timestamp, appends it and persists.
    pub fn add(&mut self, draft: TransactionDraft) -> Result<Transaction> {
        let valid = draft.validate()?;
        let now = self.clock.now();
        let record = valid.into_transaction(self.next_id(now)?, now);
        self.records.push(record.clone());
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        tracing::debug!(id = record.id, kind = %record.kind, "added transaction");
        Ok(record)
    }

    /// Removes the record with `id`. Absent ids are not an error.
    pub fn delete_by_id(&mut self, id: TransactionId) -> Result<Option<Transaction>> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(index);
        if let Err(err) = self.persist() {
            self.records.insert(index, removed);
            return Err(err);
        }
        tracing::debug!(id, "deleted transaction");
        Ok(Some(removed))
    }

    /// Replaces the whole collection with `records`.
    ///
    /// Fails with a format error when a record breaks an invariant or two
    /// records share an id; the current collection is kept in that case.
    pub fn replace_all(&mut self, records: Vec<Transaction>) -> Result<usize> {
        ensure_importable(&records)?;
        let previous = std::mem::replace(&mut self.records, records);
        if let Err(err) = self.persist() {
            self.records = previous;
            return Err(err);
        }
        tracing::info!(count = self.records.len(), "replaced transactions");
        Ok(self.records.len())
    }

    pub fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.records);
        if let Err(err) = self.persist() {
            self.records = previous;
            return Err(err);
        }
        tracing::info!(removed = previous.len(), "cleared transactions");
        Ok(())
    }

    /// Writes the current snapshot and restarts the autosave interval.
    pub fn persist(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.storage.save(&self.records, now)?;
        self.autosave.mark(now);
        Ok(())
    }

    /// Re-persists the snapshot when the autosave interval has elapsed and the
    /// collection is non-empty. Returns whether a write happened.
    pub fn autosave(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if !self.autosave.is_due(now) {
            return Ok(false);
        }
        self.autosave.mark(now);
        if self.records.is_empty() {
            return Ok(false);
        }
        self.storage.save(&self.records, now)?;
        tracing::debug!(count = self.records.len(), "autosaved transactions");
        Ok(true)
    }

    /// Replaces the collection with the records of a storage backup.
    ///
    /// The backup is checked like an import before anything is written, and
    /// the snapshot it replaces is backed up by the regular save path.
    pub fn restore_backup(&mut self, backup_id: &str) -> Result<usize> {
        let report = self.storage.read_backup(backup_id)?;
        ensure_importable(&report.transactions)?;
        let previous = std::mem::replace(&mut self.records, report.transactions);
        if let Err(err) = self.persist() {
            self.records = previous;
            return Err(err);
        }
        tracing::info!(backup = backup_id, count = self.records.len(), "restored backup");
        Ok(self.records.len())
    }

    /// Epoch milliseconds, bumped past the highest existing id when the clock
    /// has not advanced beyond it.
    fn next_id(&self, now: DateTime<Utc>) -> Result<TransactionId> {
        let candidate = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match self.records.iter().map(|record| record.id).max() {
            Some(highest) if highest >= candidate => highest.checked_add(1).ok_or_else(|| {
                TrackerError::validation(format!(
                    "cannot assign a new id after {highest}; no larger id is available"
                ))
            }),
            _ => Ok(candidate),
        }
    }
}

fn ensure_importable(records: &[Transaction]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        record
            .check_invariants()
            .map_err(|err| TrackerError::format(err.to_string()))?;
        if !seen.insert(record.id) {
            return Err(TrackerError::format(format!(
                "duplicate transaction id {}",
                record.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::clock::FixedClock,
        domain::TransactionKind,
        storage::MemoryStorage,
    };
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use std::rc::Rc;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    fn store() -> (TransactionStore, MemoryStorage, Rc<FixedClock>) {
        let storage = MemoryStorage::new();
        let clock = Rc::new(FixedClock::new(start()));
        let store = TransactionStore::open(Box::new(storage.clone()), Box::new(clock.clone()))
            .expect("open store");
        (store, storage, clock)
    }

    fn draft(amount: i64) -> TransactionDraft {
        TransactionDraft::new(TransactionKind::Expense)
            .amount(Decimal::from(amount))
            .category("Transporte")
            .description("Bus")
            .date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let (mut store, _, _) = store();
        let first = store.add(draft(1)).unwrap();
        let second = store.add(draft(2)).unwrap();
        assert_eq!(first.id, start().timestamp_millis() as u64);
        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn rejected_add_leaves_collection_untouched() {
        let (mut store, storage, _) = store();
        let err = store.add(draft(0)).unwrap_err();
        assert!(err.is_validation());
        assert!(store.is_empty());
        assert!(storage.raw().is_none());
    }

    #[test]
    fn autosave_waits_for_interval_and_skips_empty_collection() {
        let (mut store, storage, clock) = store();
        clock.advance(Duration::seconds(31));
        assert!(!store.autosave(clock.now()).unwrap());
        assert!(storage.raw().is_none());

        store.add(draft(5)).unwrap();
        clock.advance(Duration::seconds(10));
        assert!(!store.autosave(clock.now()).unwrap());
        clock.advance(Duration::seconds(25));
        assert!(store.autosave(clock.now()).unwrap());
    }

    #[test]
    fn duplicate_ids_are_rejected_on_replace() {
        let (mut store, _, _) = store();
        let kept = store.add(draft(3)).unwrap();
        let duplicate = vec![kept.clone(), kept.clone()];
        let err = store.replace_all(duplicate).unwrap_err();
        assert!(err.is_format());
        assert_eq!(store.transactions(), &[kept]);
    }

    #[test]
    fn exhausted_ids_fail_without_touching_the_collection() {
        let (mut store, storage, _) = store();
        let last = draft(4)
            .validate()
            .unwrap()
            .into_transaction(u64::MAX, start());
        store.replace_all(vec![last.clone()]).unwrap();
        let before = storage.raw();

        let err = store.add(draft(1)).unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");
        assert_eq!(store.transactions(), &[last]);
        assert_eq!(storage.raw(), before);
    }

    #[test]
    fn open_skips_stored_amounts_beyond_the_limit() {
        let raw = r#"{"transactions":[
            {"id":1,"type":"expense","amount":1e20,"category":"Salud","description":"x","date":"2024-01-01"},
            {"id":2,"type":"expense","amount":5,"category":"Salud","description":"ok","date":"2024-01-01"}
        ],"version":"1.0"}"#;
        let store = TransactionStore::open(
            Box::new(MemoryStorage::with_raw(raw)),
            Box::new(FixedClock::new(start())),
        )
        .unwrap();
        assert_eq!(store.transactions().iter().map(|r| r.id).collect::<Vec<_>>(), [2]);
    }

    #[test]
    fn open_skips_invalid_stored_records() {
        let raw = r#"{"transactions":[
            {"id":1,"type":"expense","amount":-5,"category":"Salud","description":"x","date":"2024-01-01"},
            {"id":2,"type":"expense","amount":5,"category":"Salud","description":"ok","date":"2024-01-01"}
        ],"version":"1.0"}"#;
        let storage = MemoryStorage::with_raw(raw);
        let store =
            TransactionStore::open(Box::new(storage), Box::new(FixedClock::new(start()))).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load_warnings().len(), 1);
    }
}
