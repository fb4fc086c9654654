use std::{fs, path::Path};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::Transaction,
    errors::{Result, TrackerError},
};

use super::summary_service::SummaryService;

/// Document written by `export`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportPayload {
    pub transactions: Vec<Transaction>,
    pub summary: ExportSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_transactions: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    pub export_date: DateTime<Utc>,
}

pub struct TransferService;

impl TransferService {
    pub fn export(records: &[Transaction], exported_at: DateTime<Utc>) -> ExportPayload {
        let totals = SummaryService::summary(records);
        ExportPayload {
            transactions: records.to_vec(),
            summary: ExportSummary {
                total_transactions: records.len(),
                total_income: totals.total_income,
                total_expenses: totals.total_expenses,
                export_date: exported_at,
            },
        }
    }

    pub fn export_json(records: &[Transaction], exported_at: DateTime<Utc>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::export(records, exported_at))?)
    }

    /// Default export file name, e.g. `finanzas_2024-01-31.json`.
    pub fn export_file_name(today: NaiveDate) -> String {
        format!("finanzas_{}.json", today.format("%Y-%m-%d"))
    }

    pub fn write_export(
        path: &Path,
        records: &[Transaction],
        exported_at: DateTime<Utc>,
    ) -> Result<usize> {
        let json = Self::export_json(records, exported_at)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), count = records.len(), "exported transactions");
        Ok(records.len())
    }

    /// Parses an import document. Anything other than an object with a
    /// `transactions` array of valid records is a format error.
    pub fn parse_import(raw: &str) -> Result<Vec<Transaction>> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|err| TrackerError::format(format!("file is not valid JSON: {err}")))?;
        let Some(entries) = document.get("transactions").and_then(Value::as_array) else {
            return Err(TrackerError::format(
                "expected a `transactions` array at the top level",
            ));
        };
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let record: Transaction = serde_json::from_value(entry.clone()).map_err(|err| {
                    TrackerError::format(format!("transaction #{}: {err}", index + 1))
                })?;
                record.check_invariants().map_err(|err| {
                    TrackerError::format(format!("transaction #{}: {err}", index + 1))
                })?;
                Ok(record)
            })
            .collect()
    }

    pub fn read_import(path: &Path) -> Result<Vec<Transaction>> {
        let raw = fs::read_to_string(path)?;
        Self::parse_import(&raw)
    }
}
