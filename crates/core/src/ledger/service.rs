//! Wallet and transaction use cases.

use std::sync::Arc;

use chrono::Utc;
use tally_shared::types::{Limit, MAX_LIMIT, TransactionId, UserId, WalletId};
use tracing::info;

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{
    CreateTransactionInput, CreateWalletInput, RecordedTransaction, RemovedTransaction,
    Transaction, TransactionFilter, UpdateWalletInput, Wallet,
};
use super::validation::{validate_new_transaction, validate_new_wallet, validate_wallet_changes};

/// Default size of the recent-history feed.
pub const DEFAULT_HISTORY_LIMIT: u64 = 50;

/// Service for managing wallets and their transactions.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerService {
    /// Creates a new ledger service.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Lists the owner's wallets, oldest first.
    pub async fn list_wallets(&self, owner: UserId) -> Result<Vec<Wallet>, LedgerError> {
        self.store.list_wallets(owner).await
    }

    /// Creates a wallet whose balance starts at its initial balance.
    pub async fn create_wallet(
        &self,
        owner: UserId,
        input: &CreateWalletInput,
    ) -> Result<Wallet, LedgerError> {
        let new_wallet = validate_new_wallet(owner, input)?;
        let wallet = self.store.insert_wallet(new_wallet).await?;
        info!(wallet_id = %wallet.id, owner_id = %owner, "wallet created");
        Ok(wallet)
    }

    /// Renames a wallet or changes its account number or currency.
    ///
    /// Balances are not editable here.
    pub async fn update_wallet(
        &self,
        owner: UserId,
        id: WalletId,
        input: &UpdateWalletInput,
    ) -> Result<Wallet, LedgerError> {
        let changes = validate_wallet_changes(input)?;
        self.store
            .update_wallet(owner, id, changes)
            .await?
            .ok_or(LedgerError::WalletNotFound(id))
    }

    /// Deletes a wallet together with its transactions.
    pub async fn delete_wallet(&self, owner: UserId, id: WalletId) -> Result<u64, LedgerError> {
        let removed = self
            .store
            .delete_wallet(owner, id)
            .await?
            .ok_or(LedgerError::WalletNotFound(id))?;
        info!(wallet_id = %id, transactions = removed, "wallet deleted");
        Ok(removed)
    }

    /// Records an income or expense and updates the wallet balance.
    pub async fn create_transaction(
        &self,
        owner: UserId,
        input: &CreateTransactionInput,
    ) -> Result<RecordedTransaction, LedgerError> {
        let new_tx = validate_new_transaction(owner, input, Utc::now())?;
        let recorded = self.store.record_transaction(new_tx).await?;
        info!(
            transaction_id = %recorded.transaction.id,
            wallet_id = %recorded.wallet.id,
            kind = %recorded.transaction.kind,
            amount = %recorded.transaction.amount,
            balance = %recorded.wallet.balance,
            "transaction recorded"
        );
        Ok(recorded)
    }

    /// Deletes a transaction and reverses its effect on the wallet.
    pub async fn delete_transaction(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<RemovedTransaction, LedgerError> {
        let removed = self
            .store
            .remove_transaction(owner, id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        info!(
            transaction_id = %id,
            wallet_restored = removed.wallet.is_some(),
            "transaction deleted"
        );
        Ok(removed)
    }

    /// Lists transactions matching `filter`, newest first, capped at 200.
    pub async fn list_transactions(
        &self,
        owner: UserId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.store
            .query_transactions(owner, filter, Limit::max())
            .await
    }

    /// Most recent transactions, optionally for one wallet.
    ///
    /// `limit` defaults to 50 and is clamped to `1..=200`.
    pub async fn history(
        &self,
        owner: UserId,
        wallet_id: Option<WalletId>,
        limit: Option<u64>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let filter = TransactionFilter {
            wallet_id,
            ..TransactionFilter::default()
        };
        let limit = Limit::clamped(limit, DEFAULT_HISTORY_LIMIT, MAX_LIMIT);
        self.store.query_transactions(owner, &filter, limit).await
    }
}
