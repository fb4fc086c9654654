pub mod autosave;
pub mod clock;
pub mod services;
pub mod store;

pub use autosave::AutosaveTimer;
pub use clock::{Clock, FixedClock, SystemClock};
pub use store::TransactionStore;
