use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finance_tracker::core::services::{QueryService, SummaryService};
use finance_tracker::domain::{
    Transaction, TransactionDraft, TransactionKind, EXPENSE_CATEGORIES, INCOME_CATEGORIES,
};
use finance_tracker::storage::{JsonSnapshotStorage, SnapshotStorage};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn build_sample_records(count: usize) -> Vec<Transaction> {
    let start_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    (0..count)
        .map(|idx| {
            let (kind, categories) = if idx % 4 == 0 {
                (TransactionKind::Income, INCOME_CATEGORIES)
            } else {
                (TransactionKind::Expense, EXPENSE_CATEGORIES)
            };
            TransactionDraft::new(kind)
                .amount(Decimal::new(500 + (idx % 10_000) as i64, 2))
                .category(categories[idx % categories.len()])
                .description(format!("Movimiento {idx}"))
                .date(start_date + Duration::days((idx % 730) as i64))
                .validate()
                .expect("valid draft")
                .into_transaction(idx as u64 + 1, created_at)
        })
        .collect()
}

fn bench_aggregations(c: &mut Criterion) {
    let records = build_sample_records(10_000);

    c.bench_function("summary_10k", |b| {
        b.iter(|| black_box(SummaryService::summary(black_box(&records))))
    });
    c.bench_function("monthly_series_10k", |b| {
        b.iter(|| black_box(SummaryService::monthly_series(black_box(&records))))
    });
    c.bench_function("category_breakdown_10k", |b| {
        b.iter(|| black_box(SummaryService::category_breakdown(black_box(&records))))
    });
    c.bench_function("search_10k", |b| {
        b.iter(|| black_box(QueryService::search(black_box(&records), "movimiento 99")))
    });
}

fn bench_snapshot_io(c: &mut Criterion) {
    let records = build_sample_records(10_000);
    let dir = tempdir().expect("tempdir");
    let storage =
        JsonSnapshotStorage::new(dir.path().to_path_buf(), "bench").expect("create storage");
    let updated_at = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

    c.bench_function("snapshot_save_10k", |b| {
        b.iter(|| storage.save(&records, updated_at).expect("save snapshot"))
    });

    storage.save(&records, updated_at).expect("seed");

    c.bench_function("snapshot_load_10k", |b| {
        b.iter(|| black_box(storage.load().expect("load snapshot")))
    });
}

criterion_group!(benches, bench_aggregations, bench_snapshot_io);
criterion_main!(benches);
