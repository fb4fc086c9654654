//! Domain models for income and expense records.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

use super::category::is_valid_category;

/// Identifier assigned to a record when it is added to the store.
pub type TransactionId = u64;

/// Exclusive upper bound for a single amount (one trillion). Keeps every sum
/// the aggregator can build far inside `Decimal`'s range.
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Amounts carry at most cents, so together with [`AMOUNT_LIMIT`] they stay
/// within 14 significant digits and survive the JSON number round trip.
pub const AMOUNT_DECIMALS: u32 = 2;

fn amount_problem(amount: Decimal) -> Option<String> {
    if amount <= Decimal::ZERO {
        Some("enter a valid amount greater than 0".into())
    } else if amount >= AMOUNT_LIMIT {
        Some(format!("amount must be below {AMOUNT_LIMIT}"))
    } else if amount.normalize().scale() > AMOUNT_DECIMALS {
        Some(format!("amount can have at most {AMOUNT_DECIMALS} decimal places"))
    } else {
        None
    }
}

/// Enumerates the two kinds of record a user can enter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Label shown in list views.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Ingreso",
            TransactionKind::Expense => "Gasto",
        }
    }

    pub fn sign(self) -> char {
        match self {
            TransactionKind::Income => '+',
            TransactionKind::Expense => '-',
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TransactionKind::Income => TransactionKind::Expense,
            TransactionKind::Expense => TransactionKind::Income,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "ingreso" | "ingresos" => Ok(TransactionKind::Income),
            "expense" | "gasto" | "gastos" => Ok(TransactionKind::Expense),
            other => Err(TrackerError::validation(format!(
                "unknown transaction type `{other}` (expected income or expense)"
            ))),
        }
    }
}

/// A persisted income or expense record. Records are never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Calendar month key in `YYYY-MM` form.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Amount with the sign implied by the record kind.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Case-insensitive substring match against description or category.
    /// `needle` must already be lowercase.
    pub fn matches_term(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }

    /// Checks the record-level invariants that every stored record satisfies.
    pub fn check_invariants(&self) -> Result<()> {
        if let Some(problem) = amount_problem(self.amount) {
            return Err(TrackerError::validation(format!("record {}: {problem}", self.id)));
        }
        if self.description.trim().is_empty() {
            return Err(TrackerError::validation(format!(
                "record {} has an empty description",
                self.id
            )));
        }
        if !is_valid_category(self.kind, &self.category) {
            return Err(TrackerError::validation(format!(
                "record {} uses category `{}` which is not valid for {}",
                self.id, self.category, self.kind
            )));
        }
        Ok(())
    }
}

/// User input for a new record, validated by [`TransactionDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: String,
    pub date: Option<NaiveDate>,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Validates the draft in form order: amount, category, description, date.
    pub fn validate(&self) -> Result<ValidDraft> {
        let amount = self
            .amount
            .ok_or_else(|| TrackerError::validation("enter a valid amount greater than 0"))?;
        if let Some(problem) = amount_problem(amount) {
            return Err(TrackerError::validation(problem));
        }
        let category = match self.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => category,
            _ => return Err(TrackerError::validation("select a category")),
        };
        if !is_valid_category(self.kind, category) {
            return Err(TrackerError::validation(format!(
                "category `{category}` is not available for {}",
                self.kind
            )));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(TrackerError::validation("enter a description"));
        }
        let date = self
            .date
            .ok_or_else(|| TrackerError::validation("select a date"))?;

        Ok(ValidDraft {
            kind: self.kind,
            amount,
            category: category.to_string(),
            description: description.to_string(),
            date,
        })
    }
}

/// A draft that passed validation and only lacks an id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl ValidDraft {
    pub fn into_transaction(self, id: TransactionId, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            created_at,
        }
    }
}
