#![allow(dead_code)]

use std::{path::PathBuf, rc::Rc, sync::Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use finance_tracker::{
    core::{FixedClock, TransactionStore},
    domain::{Transaction, TransactionDraft, TransactionKind},
    storage::{JsonSnapshotStorage, MemoryStorage},
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 31, 18, 0, 0).unwrap()
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid decimal")
}

pub fn draft(
    kind: TransactionKind,
    amount: &str,
    category: &str,
    description: &str,
    on: &str,
) -> TransactionDraft {
    TransactionDraft::new(kind)
        .amount(dec(amount))
        .category(category)
        .description(description)
        .date(date(on))
}

pub fn income(amount: &str, category: &str, description: &str, on: &str) -> TransactionDraft {
    draft(TransactionKind::Income, amount, category, description, on)
}

pub fn expense(amount: &str, category: &str, description: &str, on: &str) -> TransactionDraft {
    draft(TransactionKind::Expense, amount, category, description, on)
}

/// Builds a stored record without going through a store.
pub fn record(id: u64, draft: TransactionDraft) -> Transaction {
    draft
        .validate()
        .expect("valid draft")
        .into_transaction(id, start_time())
}

pub struct MemoryFixture {
    pub store: TransactionStore,
    pub storage: MemoryStorage,
    pub clock: Rc<FixedClock>,
}

/// Store backed by an in-memory slot and a manually driven clock.
pub fn memory_store() -> MemoryFixture {
    let storage = MemoryStorage::new();
    let clock = Rc::new(FixedClock::new(start_time()));
    let store = TransactionStore::open(Box::new(storage.clone()), Box::new(clock.clone()))
        .expect("open memory store");
    MemoryFixture {
        store,
        storage,
        clock,
    }
}

pub struct FileFixture {
    pub store: TransactionStore,
    pub storage: JsonSnapshotStorage,
    pub clock: Rc<FixedClock>,
    pub dir: PathBuf,
}

/// Store backed by a JSON file in a fresh temp directory.
pub fn file_store(retention: usize) -> FileFixture {
    let dir = temp_dir();
    let storage =
        JsonSnapshotStorage::with_retention(dir.clone(), "financeTransactions", retention)
            .expect("create json storage");
    let clock = Rc::new(FixedClock::new(start_time()));
    let store = TransactionStore::open(Box::new(storage.clone()), Box::new(clock.clone()))
        .expect("open file store");
    FileFixture {
        store,
        storage,
        clock,
        dir,
    }
}
