pub mod category;
pub mod transaction;

pub use category::{
    categories_for, is_valid_category, resolve_category, EXPENSE_CATEGORIES, INCOME_CATEGORIES,
};
pub use transaction::{
    Transaction, TransactionDraft, TransactionId, TransactionKind, ValidDraft, AMOUNT_DECIMALS,
    AMOUNT_LIMIT,
};
