//! Transaction repository: booking, reversal, listing, and sums.
//!
//! Booking and reversal lock the wallet row (`SELECT ... FOR UPDATE`) inside a
//! database transaction, so the funds check and both writes see one
//! consistent balance even under concurrent requests.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    sea_query::Expr,
};
use tally_core::ledger::{
    KindTotals, LedgerError, NewTransaction, OccurredRange, RangeEnd, Transaction,
    TransactionFilter, TransactionKind, book, reverse_transaction,
};
use tally_shared::types::{Limit, TransactionId, UserId, WalletId};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::TransactionType, transactions, wallets};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Wallet not found for this owner.
    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    /// A ledger rule rejected the operation (e.g. insufficient funds).
    #[error(transparent)]
    Rejected(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<transactions::Model> for Transaction {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: TransactionId::from_uuid(model.id),
            owner_id: UserId::from_uuid(model.owner_id),
            wallet_id: WalletId::from_uuid(model.wallet_id),
            kind: model.kind.into(),
            amount: model.amount,
            category: model.category,
            note: model.note,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
        }
    }
}

/// Row of the per-kind sum query.
#[derive(Debug, FromQueryResult)]
struct KindTotalRow {
    kind: String,
    total: Option<Decimal>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Locks one of the owner's wallets for the rest of `txn`.
    async fn lock_wallet(
        txn: &DatabaseTransaction,
        owner: Uuid,
        wallet_id: Uuid,
    ) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::OwnerId.eq(owner))
            .lock_exclusive()
            .one(txn)
            .await
    }

    /// Stores a transaction and applies it to the wallet balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletNotFound`, `Rejected(InsufficientFunds)`, or a
    /// database error. Nothing is written on error.
    pub async fn record(
        &self,
        input: NewTransaction,
    ) -> Result<(transactions::Model, wallets::Model), TransactionError> {
        let owner = input.owner_id.into_inner();
        let wallet_id = input.wallet_id.into_inner();

        let txn = self.db.begin().await?;

        let wallet = Self::lock_wallet(&txn, owner, wallet_id)
            .await?
            .ok_or(TransactionError::WalletNotFound(wallet_id))?;
        let new_balance = book(wallet.balance, input.kind, input.amount)?;

        let now = Utc::now();
        let transaction = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            owner_id: Set(owner),
            wallet_id: Set(wallet_id),
            kind: Set(input.kind.into()),
            amount: Set(input.amount),
            category: Set(input.category),
            note: Set(input.note),
            occurred_at: Set(input.occurred_at),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut wallet: wallets::ActiveModel = wallet.into();
        wallet.balance = Set(new_balance);
        wallet.updated_at = Set(now);
        let wallet = wallet.update(&txn).await?;

        txn.commit().await?;
        Ok((transaction, wallet))
    }

    /// Deletes a transaction and reverses it on its wallet, if the wallet exists.
    ///
    /// The wallet is locked before the delete so that reversal and wallet
    /// deletion take locks in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn remove(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<(transactions::Model, Option<wallets::Model>)>, DbErr> {
        let owner = owner.into_inner();
        let Some(existing) = transactions::Entity::find_by_id(id.into_inner())
            .filter(transactions::Column::OwnerId.eq(owner))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let txn = self.db.begin().await?;
        let wallet = Self::lock_wallet(&txn, owner, existing.wallet_id).await?;

        let deleted = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(existing.id))
            .filter(transactions::Column::OwnerId.eq(owner))
            .exec(&txn)
            .await?
            .rows_affected;
        if deleted == 0 {
            // Lost a race with another delete.
            debug!(transaction_id = %existing.id, "transaction already deleted");
            return Ok(None);
        }

        let wallet = match wallet {
            Some(wallet) => {
                let reversed = reverse_transaction(
                    wallet.balance,
                    existing.kind.into(),
                    existing.amount,
                );
                let mut wallet: wallets::ActiveModel = wallet.into();
                wallet.balance = Set(reversed);
                wallet.updated_at = Set(Utc::now());
                Some(wallet.update(&txn).await?)
            }
            None => None,
        };

        txn.commit().await?;
        Ok(Some((existing, wallet)))
    }

    fn scoped(
        owner: UserId,
        wallet_id: Option<WalletId>,
        range: &OccurredRange,
    ) -> Select<transactions::Entity> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(owner.into_inner()));

        if let Some(wallet_id) = wallet_id {
            query = query.filter(transactions::Column::WalletId.eq(wallet_id.into_inner()));
        }
        if let Some(from) = range.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        match range.to {
            Some(RangeEnd::Inclusive(to)) => {
                query = query.filter(transactions::Column::OccurredAt.lte(to));
            }
            Some(RangeEnd::Exclusive(to)) => {
                query = query.filter(transactions::Column::OccurredAt.lt(to));
            }
            None => {}
        }
        query
    }

    /// Lists matching transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        owner: UserId,
        filter: &TransactionFilter,
        limit: Limit,
    ) -> Result<Vec<transactions::Model>, DbErr> {
        let mut query = Self::scoped(owner, filter.wallet_id, &filter.range);
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(TransactionType::from(kind)));
        }

        query
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit.get())
            .all(&self.db)
            .await
    }

    /// Sums amounts per kind over the matching transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn sum_by_kind(
        &self,
        owner: UserId,
        wallet_id: Option<WalletId>,
        range: &OccurredRange,
    ) -> Result<KindTotals, DbErr> {
        let rows = Self::scoped(owner, wallet_id, range)
            .select_only()
            .column(transactions::Column::Kind)
            .column_as(Expr::col(transactions::Column::Amount).sum(), "total")
            .group_by(transactions::Column::Kind)
            .into_model::<KindTotalRow>()
            .all(&self.db)
            .await?;

        let mut totals = KindTotals::default();
        for row in rows {
            let kind: TransactionKind = row
                .kind
                .parse()
                .map_err(DbErr::Type)?;
            totals.add(kind, row.total.unwrap_or(Decimal::ZERO));
        }
        Ok(totals)
    }
}
