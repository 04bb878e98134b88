//! Ledger error types for validation, lookup, and storage failures.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{MoneyRangeError, TransactionId, WalletId};
use thiserror::Error;

/// Errors that can occur during wallet and transaction operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A required field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Transaction amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Opening balance cannot be negative.
    #[error("Initial balance cannot be negative")]
    NegativeInitialBalance,

    /// Transaction type is neither income nor expense.
    #[error("Invalid transaction type: {0}")]
    InvalidKind(String),

    /// Currency code is not a three-letter code.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// A monetary field cannot be stored exactly.
    #[error("{field}: {reason}")]
    UnstorableAmount {
        /// Field that carried the value.
        field: &'static str,
        /// Which storage limit was exceeded.
        reason: MoneyRangeError,
    },

    // ========== Lookup Errors ==========
    /// Wallet not found for this owner.
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// Transaction not found for this owner.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // ========== Business Rule Errors ==========
    /// The owner already has a wallet with this account number.
    #[error("Account number already in use: {0}")]
    DuplicateAccountNumber(String),

    /// Expense exceeds the wallet balance.
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        balance: Decimal,
        /// Expense amount.
        requested: Decimal,
    },

    /// Income would push the wallet balance past the storable range.
    #[error("Resulting balance out of range: balance {balance}, income {requested}")]
    BalanceOutOfRange {
        /// Balance at the time of the check.
        balance: Decimal,
        /// Income amount.
        requested: Decimal,
    },

    // ========== Infrastructure ==========
    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// True for errors caused by malformed client input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::NonPositiveAmount
                | Self::NegativeInitialBalance
                | Self::InvalidKind(_)
                | Self::InvalidCurrency(_)
                | Self::UnstorableAmount { .. }
                | Self::BalanceOutOfRange { .. }
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::WalletNotFound(_) | LedgerError::TransactionNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            LedgerError::DuplicateAccountNumber(_) => Self::Conflict(err.to_string()),
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds(err.to_string()),
            LedgerError::Storage(msg) => Self::Database(msg),
            _ => Self::Validation(err.to_string()),
        }
    }
}
