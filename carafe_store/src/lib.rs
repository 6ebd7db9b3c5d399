#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Ledger implementations for the coffee station.
//!
//! - `SqliteLedger`: durable store (bundled SQLite), one row per served share.
//! - `MemoryLedger`: same contract in memory, for simulation and tests.
//!
//! "Today" is the local calendar day of the entry's timestamp.
pub mod error;
pub mod memory;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

use chrono::{DateTime, Local, NaiveDate};
use std::time::SystemTime;

/// Local calendar day of a wall-clock instant.
pub fn local_day(at: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(at).date_naive()
}

/// Local calendar day right now.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
