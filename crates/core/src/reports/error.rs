//! Report error types.

use chrono::{DateTime, Utc};
use tally_shared::AppError;
use tally_shared::types::WalletId;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The owner has no wallets at all.
    #[error("No wallets to report on")]
    NoWallets,

    /// The requested wallet does not exist for this owner.
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// `from` is after `to`.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange {
        /// Requested start.
        from: DateTime<Utc>,
        /// Requested end.
        to: DateTime<Utc>,
    },

    /// Failure while reading the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NoWallets | ReportError::WalletNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ReportError::InvalidRange { .. } => Self::Validation(err.to_string()),
            ReportError::Ledger(inner) => inner.into(),
        }
    }
}
