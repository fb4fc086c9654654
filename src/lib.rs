#![doc(test(attr(deny(warnings))))]

//! Finance Tracker keeps a list of income and expense records in a local JSON
//! snapshot and derives totals, monthly series, and category breakdowns from it.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("finance tracker tracing initialized");
    });
}
