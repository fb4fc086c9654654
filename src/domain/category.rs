//! Fixed category sets offered for each transaction kind.

use super::transaction::TransactionKind;

/// Categories accepted for income records.
pub const INCOME_CATEGORIES: &[&str] = &[
    "Salario",
    "Freelance",
    "Inversiones",
    "Bonos",
    "Ventas",
    "Otros Ingresos",
];

/// Categories accepted for expense records.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentación",
    "Transporte",
    "Vivienda",
    "Entretenimiento",
    "Salud",
    "Educación",
    "Compras",
    "Servicios",
    "Ropa",
    "Otros Gastos",
];

/// Returns the category set for `kind`.
pub fn categories_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => INCOME_CATEGORIES,
        TransactionKind::Expense => EXPENSE_CATEGORIES,
    }
}

/// Returns `true` when `name` is an exact member of the category set for `kind`.
pub fn is_valid_category(kind: TransactionKind, name: &str) -> bool {
    categories_for(kind).contains(&name)
}

/// Resolves user input to the canonical category name, ignoring case and
/// surrounding whitespace.
pub fn resolve_category(kind: TransactionKind, input: &str) -> Option<&'static str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    categories_for(kind)
        .iter()
        .copied()
        .find(|candidate| candidate.to_lowercase() == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_sets_are_disjoint() {
        for income in INCOME_CATEGORIES {
            assert!(
                !EXPENSE_CATEGORIES.contains(income),
                "{income} listed for both kinds"
            );
        }
    }

    #[test]
    fn resolve_matches_case_insensitively() {
        assert_eq!(
            resolve_category(TransactionKind::Expense, "  alimentación "),
            Some("Alimentación")
        );
        assert_eq!(
            resolve_category(TransactionKind::Income, "otros ingresos"),
            Some("Otros Ingresos")
        );
        assert_eq!(resolve_category(TransactionKind::Income, "Compras"), None);
        assert_eq!(resolve_category(TransactionKind::Income, "   "), None);
    }

    #[test]
    fn validity_depends_on_kind() {
        assert!(is_valid_category(TransactionKind::Income, "Salario"));
        assert!(!is_valid_category(TransactionKind::Expense, "Salario"));
        assert!(!is_valid_category(TransactionKind::Expense, "salud"));
    }
}
