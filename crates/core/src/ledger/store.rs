//! Persistence port for wallets and transactions.

use async_trait::async_trait;
use tally_shared::types::{Limit, TransactionId, UserId, WalletId};

use super::error::LedgerError;
use super::types::{
    KindTotals, NewTransaction, NewWallet, OccurredRange, RecordedTransaction, RemovedTransaction,
    Transaction, TransactionFilter, Wallet, WalletChanges,
};

/// Storage for wallets and transactions.
///
/// Implemented by the db crate for PostgreSQL and by [`crate::memory`] for
/// tests. Every method is scoped to `owner`: records of other users behave as
/// if they did not exist.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All wallets of `owner`, oldest first.
    async fn list_wallets(&self, owner: UserId) -> Result<Vec<Wallet>, LedgerError>;

    /// A single wallet of `owner`.
    async fn find_wallet(&self, owner: UserId, id: WalletId)
    -> Result<Option<Wallet>, LedgerError>;

    /// Stores a new wallet with `balance = initial_balance`.
    ///
    /// Fails with `DuplicateAccountNumber` if the owner already uses the number.
    async fn insert_wallet(&self, wallet: NewWallet) -> Result<Wallet, LedgerError>;

    /// Applies `changes`; `None` if the wallet does not exist.
    ///
    /// Fails with `DuplicateAccountNumber` if the new number is taken.
    async fn update_wallet(
        &self,
        owner: UserId,
        id: WalletId,
        changes: WalletChanges,
    ) -> Result<Option<Wallet>, LedgerError>;

    /// Deletes the wallet's transactions, then the wallet, atomically.
    ///
    /// Returns how many transactions went with it, `None` if the wallet
    /// does not exist.
    async fn delete_wallet(&self, owner: UserId, id: WalletId) -> Result<Option<u64>, LedgerError>;

    /// Records a transaction and updates the wallet balance atomically.
    ///
    /// The wallet is re-read under the store's lock, checked with
    /// [`super::balance::book`], and both writes commit together. Fails with
    /// `WalletNotFound` or `InsufficientFunds`.
    async fn record_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<RecordedTransaction, LedgerError>;

    /// Deletes a transaction and reverses it on its wallet atomically.
    ///
    /// A wallet that no longer exists is skipped. `None` if the transaction
    /// does not exist.
    async fn remove_transaction(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<RemovedTransaction>, LedgerError>;

    /// Matching transactions, newest `occurred_at` first, at most `limit`.
    async fn query_transactions(
        &self,
        owner: UserId,
        filter: &TransactionFilter,
        limit: Limit,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Income and expense sums over the matching transactions.
    async fn sum_by_kind(
        &self,
        owner: UserId,
        wallet_id: Option<WalletId>,
        range: &OccurredRange,
    ) -> Result<KindTotals, LedgerError>;
}
