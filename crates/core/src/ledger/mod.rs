//! Wallets, transactions, and the running-balance rules that tie them together.
//!
//! - Wallet balance arithmetic and the funds guard
//! - Domain types and input validation
//! - The `LedgerStore` persistence port
//! - `LedgerService` use cases

pub mod balance;
pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use balance::{apply_transaction, book, ensure_sufficient_funds, reverse_transaction};
pub use error::LedgerError;
pub use service::{DEFAULT_HISTORY_LIMIT, LedgerService};
pub use store::LedgerStore;
pub use types::{
    CreateTransactionInput, CreateWalletInput, KindTotals, NewTransaction, NewWallet,
    OccurredRange, RangeEnd, RecordedTransaction, RemovedTransaction, Transaction,
    TransactionFilter, TransactionKind, UpdateWalletInput, Wallet, WalletChanges,
};
