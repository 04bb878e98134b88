//! Summary reports.
//!
//! Balances for a period are rebuilt from transaction history rather than
//! read from the materialized wallet balance:
//! - opening balance: initial balances plus everything before `from`
//! - income and expense inside `[from, to]`
//! - closing balance: opening plus income minus expense

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
