pub mod query_service;
pub mod summary_service;
pub mod transfer_service;

pub use query_service::{QueryService, TransactionFilter};
pub use summary_service::{CategoryTotal, MonthlyTotals, Summary, SummaryService};
pub use transfer_service::{ExportPayload, ExportSummary, TransferService};
