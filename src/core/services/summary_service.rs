use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::domain::{Transaction, TransactionKind};

/// Maximum number of categories returned by [`SummaryService::category_breakdown`].
pub const CATEGORY_CHART_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

/// Income and expense sums for one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

pub struct SummaryService;

impl SummaryService {
    pub fn summary(records: &[Transaction]) -> Summary {
        let mut summary = Summary::default();
        for record in records {
            match record.kind {
                TransactionKind::Income => summary.total_income += record.amount,
                TransactionKind::Expense => summary.total_expenses += record.amount,
            }
        }
        summary.balance = summary.total_income - summary.total_expenses;
        summary
    }

    /// Per-month totals in ascending month order. Months only appear when at
    /// least one record falls in them.
    pub fn monthly_series(records: &[Transaction]) -> Vec<MonthlyTotals> {
        let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for record in records {
            let entry = months.entry(record.month_key()).or_default();
            match record.kind {
                TransactionKind::Income => entry.0 += record.amount,
                TransactionKind::Expense => entry.1 += record.amount,
            }
        }
        months
            .into_iter()
            .map(|(month, (income, expenses))| MonthlyTotals {
                month,
                income,
                expenses,
            })
            .collect()
    }

    /// Expense totals per category, largest first, capped at
    /// [`CATEGORY_CHART_LIMIT`]. Equal totals keep first-seen order.
    pub fn category_breakdown(records: &[Transaction]) -> Vec<CategoryTotal> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for record in records.iter().filter(|record| record.is_expense()) {
            match positions.get(record.category.as_str()) {
                Some(&index) => totals[index].total += record.amount,
                None => {
                    positions.insert(&record.category, totals.len());
                    totals.push(CategoryTotal {
                        category: record.category.clone(),
                        total: record.amount,
                    });
                }
            }
        }
        totals.sort_by(|a, b| b.total.cmp(&a.total));
        totals.truncate(CATEGORY_CHART_LIMIT);
        totals
    }
}
