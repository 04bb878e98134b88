//! Wallet repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tally_core::ledger::{NewWallet, Wallet, WalletChanges};
use tally_shared::types::{CurrencyCode, UserId, WalletId};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{transactions, wallets};

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The owner already has a wallet with this account number.
    #[error("Account number already in use: {0}")]
    DuplicateAccountNumber(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Parses the stored currency, falling back to the default on corrupt rows.
fn stored_currency(wallet_id: Uuid, raw: &str) -> CurrencyCode {
    raw.parse().unwrap_or_else(|_| {
        warn!(
            %wallet_id,
            currency = raw,
            fallback = %CurrencyCode::default(),
            "stored wallet currency is invalid, using default"
        );
        CurrencyCode::default()
    })
}

impl From<wallets::Model> for Wallet {
    fn from(model: wallets::Model) -> Self {
        let currency = stored_currency(model.id, &model.currency);
        Self {
            id: WalletId::from_uuid(model.id),
            owner_id: UserId::from_uuid(model.owner_id),
            name: model.name,
            account_number: model.account_number,
            initial_balance: model.initial_balance,
            balance: model.balance,
            currency,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Maps a unique-constraint violation on the account number.
fn map_unique(err: DbErr, account_number: &str) -> WalletError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            WalletError::DuplicateAccountNumber(account_number.to_string())
        }
        _ => WalletError::Database(err),
    }
}

/// Wallet repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an owner's wallets, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, owner: UserId) -> Result<Vec<wallets::Model>, DbErr> {
        wallets::Entity::find()
            .filter(wallets::Column::OwnerId.eq(owner.into_inner()))
            .order_by_asc(wallets::Column::CreatedAt)
            .order_by_asc(wallets::Column::Id)
            .all(&self.db)
            .await
    }

    /// Finds one of the owner's wallets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, owner: UserId, id: WalletId) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find_by_id(id.into_inner())
            .filter(wallets::Column::OwnerId.eq(owner.into_inner()))
            .one(&self.db)
            .await
    }

    /// Inserts a wallet whose balance starts at its initial balance.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountNumber` on a taken account number.
    pub async fn create(&self, input: NewWallet) -> Result<wallets::Model, WalletError> {
        let now = Utc::now();
        let wallet = wallets::ActiveModel {
            id: Set(WalletId::new().into_inner()),
            owner_id: Set(input.owner_id.into_inner()),
            name: Set(input.name),
            account_number: Set(input.account_number.clone()),
            initial_balance: Set(input.initial_balance),
            balance: Set(input.initial_balance),
            currency: Set(input.currency.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        wallet
            .insert(&self.db)
            .await
            .map_err(|e| map_unique(e, &input.account_number))
    }

    /// Applies name, account number, and currency changes.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountNumber` on a taken account number.
    pub async fn update(
        &self,
        owner: UserId,
        id: WalletId,
        changes: WalletChanges,
    ) -> Result<Option<wallets::Model>, WalletError> {
        let Some(existing) = self.find(owner, id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let account_number = changes
            .account_number
            .clone()
            .unwrap_or_else(|| existing.account_number.clone());

        let mut wallet: wallets::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            wallet.name = Set(name);
        }
        if let Some(number) = changes.account_number {
            wallet.account_number = Set(number);
        }
        if let Some(currency) = changes.currency {
            wallet.currency = Set(currency.to_string());
        }
        wallet.updated_at = Set(Utc::now());

        wallet
            .update(&self.db)
            .await
            .map(Some)
            .map_err(|e| map_unique(e, &account_number))
    }

    /// Deletes the wallet's transactions, then the wallet, in one transaction.
    ///
    /// Returns the number of deleted transactions, `None` if the wallet
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_cascade(&self, owner: UserId, id: WalletId) -> Result<Option<u64>, DbErr> {
        let txn = self.db.begin().await?;

        let wallet = wallets::Entity::find_by_id(id.into_inner())
            .filter(wallets::Column::OwnerId.eq(owner.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?;
        if wallet.is_none() {
            return Ok(None);
        }

        let removed = transactions::Entity::delete_many()
            .filter(transactions::Column::OwnerId.eq(owner.into_inner()))
            .filter(transactions::Column::WalletId.eq(id.into_inner()))
            .exec(&txn)
            .await?
            .rows_affected;

        wallets::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(removed))
    }
}
