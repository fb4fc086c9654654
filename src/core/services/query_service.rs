use std::collections::BTreeSet;

use crate::domain::{Transaction, TransactionKind};

/// Optional predicates combined with AND. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    /// Prefix of the `YYYY-MM-DD` date, e.g. `2024-01` or `2024`.
    pub month_prefix: Option<String>,
}

impl TransactionFilter {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.category.is_none() && self.month_prefix.is_none()
    }

    pub fn matches(&self, record: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &record.category != category {
                return false;
            }
        }
        if let Some(prefix) = &self.month_prefix {
            if !record.date.format("%Y-%m-%d").to_string().starts_with(prefix.as_str()) {
                return false;
            }
        }
        true
    }
}

pub struct QueryService;

impl QueryService {
    /// Records newest date first; records sharing a date keep insertion order.
    pub fn sort_for_display(records: &[Transaction]) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = records.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    pub fn filter<'a>(records: &'a [Transaction], filter: &TransactionFilter) -> Vec<&'a Transaction> {
        Self::sort_for_display(records)
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect()
    }

    /// Case-insensitive substring search over description and category. Only
    /// the empty term returns every record; whitespace is matched literally.
    pub fn search<'a>(records: &'a [Transaction], term: &str) -> Vec<&'a Transaction> {
        let needle = term.to_lowercase();
        Self::sort_for_display(records)
            .into_iter()
            .filter(|record| needle.is_empty() || record.matches_term(&needle))
            .collect()
    }

    pub fn categories_in_use(records: &[Transaction]) -> Vec<String> {
        records
            .iter()
            .map(|record| record.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionDraft;
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn record(id: u64, kind: TransactionKind, category: &str, description: &str, date: &str) -> Transaction {
        TransactionDraft::new(kind)
            .amount(Decimal::ONE)
            .category(category)
            .description(description)
            .date(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
            .validate()
            .unwrap()
            .into_transaction(id, DateTime::<Utc>::default())
    }

    fn sample() -> Vec<Transaction> {
        vec![
            record(1, TransactionKind::Expense, "Compras", "Zapatos", "2024-01-10"),
            record(2, TransactionKind::Expense, "Alimentación", "Supermercado", "2024-02-02"),
            record(3, TransactionKind::Income, "Salario", "Nómina", "2024-01-10"),
        ]
    }

    #[test]
    fn display_order_is_date_descending_and_stable() {
        let records = sample();
        let ids: Vec<_> = QueryService::sort_for_display(&records)
            .iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, [2, 1, 3]);
    }

    #[test]
    fn filters_combine_with_and() {
        let records = sample();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            month_prefix: Some("2024-01".into()),
            ..TransactionFilter::default()
        };
        let matched = QueryService::filter(&records, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 1);

        let by_year = TransactionFilter {
            month_prefix: Some("2024".into()),
            ..TransactionFilter::default()
        };
        assert_eq!(QueryService::filter(&records, &by_year).len(), 3);
        assert!(TransactionFilter::default().is_empty());
    }

    #[test]
    fn search_matches_description_or_category() {
        let records = sample();
        let hits = QueryService::search(&records, "SUPER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        assert_eq!(QueryService::search(&records, "compr").len(), 1);
        assert_eq!(QueryService::search(&records, "").len(), 3);
    }

    #[test]
    fn whitespace_terms_are_not_trimmed() {
        let mut records = sample();
        records.push(record(4, TransactionKind::Expense, "Compras", "Camisa azul", "2024-03-01"));
        let hits = QueryService::search(&records, " ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 4);
        assert!(QueryService::search(&records, " zapatos").is_empty());
    }

    #[test]
    fn categories_in_use_are_sorted_and_unique() {
        let mut records = sample();
        records.push(record(4, TransactionKind::Expense, "Compras", "Camisa", "2024-03-01"));
        assert_eq!(
            QueryService::categories_in_use(&records),
            ["Alimentación", "Compras", "Salario"]
        );
    }
}
