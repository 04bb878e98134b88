//! `PostgreSQL` implementations of the core persistence ports.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use tally_core::auth::{AuthError, NewUser, User, UserStore};
use tally_core::ledger::{
    KindTotals, LedgerError, LedgerStore, NewTransaction, NewWallet, OccurredRange,
    RecordedTransaction, RemovedTransaction, Transaction, TransactionFilter, Wallet,
    WalletChanges,
};
use tally_shared::types::{Limit, TransactionId, UserId, WalletId};

use super::transaction::{TransactionError, TransactionRepository};
use super::user::{UserError, UserRepository};
use super::wallet::{WalletError, WalletRepository};

fn storage(err: DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

impl From<WalletError> for LedgerError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::DuplicateAccountNumber(number) => Self::DuplicateAccountNumber(number),
            WalletError::Database(e) => storage(e),
        }
    }
}

impl From<TransactionError> for LedgerError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::WalletNotFound(id) => Self::WalletNotFound(WalletId::from_uuid(id)),
            TransactionError::Rejected(e) => e,
            TransactionError::Database(e) => storage(e),
        }
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(email) => Self::EmailTaken(email),
            UserError::NotFound(id) => Self::UserNotFound(UserId::from_uuid(id)),
            UserError::Database(e) => Self::Storage(e.to_string()),
        }
    }
}

/// Database-backed store for users, wallets, and transactions.
#[derive(Debug, Clone)]
pub struct DbStore {
    wallets: WalletRepository,
    transactions: TransactionRepository,
    users: UserRepository,
}

impl DbStore {
    /// Creates a store sharing one connection pool across repositories.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            wallets: WalletRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }
}

#[async_trait]
impl LedgerStore for DbStore {
    async fn list_wallets(&self, owner: UserId) -> Result<Vec<Wallet>, LedgerError> {
        let models = self.wallets.list(owner).await.map_err(storage)?;
        Ok(models.into_iter().map(Wallet::from).collect())
    }

    async fn find_wallet(
        &self,
        owner: UserId,
        id: WalletId,
    ) -> Result<Option<Wallet>, LedgerError> {
        let model = self.wallets.find(owner, id).await.map_err(storage)?;
        Ok(model.map(Wallet::from))
    }

    async fn insert_wallet(&self, wallet: NewWallet) -> Result<Wallet, LedgerError> {
        Ok(self.wallets.create(wallet).await?.into())
    }

    async fn update_wallet(
        &self,
        owner: UserId,
        id: WalletId,
        changes: WalletChanges,
    ) -> Result<Option<Wallet>, LedgerError> {
        Ok(self.wallets.update(owner, id, changes).await?.map(Wallet::from))
    }

    async fn delete_wallet(&self, owner: UserId, id: WalletId) -> Result<Option<u64>, LedgerError> {
        self.wallets.delete_cascade(owner, id).await.map_err(storage)
    }

    async fn record_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<RecordedTransaction, LedgerError> {
        let (transaction, wallet) = self.transactions.record(transaction).await?;
        Ok(RecordedTransaction {
            transaction: transaction.into(),
            wallet: wallet.into(),
        })
    }

    async fn remove_transaction(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<RemovedTransaction>, LedgerError> {
        let removed = self.transactions.remove(owner, id).await.map_err(storage)?;
        Ok(removed.map(|(transaction, wallet)| RemovedTransaction {
            transaction: transaction.into(),
            wallet: wallet.map(Wallet::from),
        }))
    }

    async fn query_transactions(
        &self,
        owner: UserId,
        filter: &TransactionFilter,
        limit: Limit,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let models = self
            .transactions
            .list(owner, filter, limit)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(Transaction::from).collect())
    }

    async fn sum_by_kind(
        &self,
        owner: UserId,
        wallet_id: Option<WalletId>,
        range: &OccurredRange,
    ) -> Result<KindTotals, LedgerError> {
        self.transactions
            .sum_by_kind(owner, wallet_id, range)
            .await
            .map_err(storage)
    }
}

#[async_trait]
impl UserStore for DbStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let model = self
            .users
            .find_by_id(id.into_inner())
            .await
            .map_err(UserError::from)?;
        Ok(model.map(User::from))
    }

    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>, AuthError> {
        let model = self
            .users
            .find_by_subject(subject)
            .await
            .map_err(UserError::from)?;
        Ok(model.map(User::from))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AuthError> {
        Ok(self.users.create(user).await?.into())
    }

    async fn update_profile(
        &self,
        id: UserId,
        display_name: String,
        avatar_url: Option<String>,
    ) -> Result<User, AuthError> {
        Ok(self
            .users
            .update_profile(id.into_inner(), display_name, avatar_url)
            .await?
            .into())
    }
}
