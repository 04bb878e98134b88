//! In-memory implementation of the persistence ports.
//!
//! Every mutation runs under a single async mutex, which gives the same
//! atomicity the database store gets from row locks and transactions.

use async_trait::async_trait;
use chrono::Utc;
use tally_shared::types::{Limit, TransactionId, UserId, WalletId};
use tokio::sync::Mutex;

use crate::auth::{AuthError, NewUser, User, UserStore};
use crate::ledger::balance::{book, reverse_transaction};
use crate::ledger::{
    KindTotals, LedgerError, LedgerStore, NewTransaction, NewWallet, OccurredRange,
    RecordedTransaction, RemovedTransaction, Transaction, TransactionFilter, Wallet,
    WalletChanges,
};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    // Insertion order doubles as creation order.
    wallets: Vec<Wallet>,
    transactions: Vec<Transaction>,
}

impl State {
    fn wallet_mut(&mut self, owner: UserId, id: WalletId) -> Option<&mut Wallet> {
        self.wallets
            .iter_mut()
            .find(|w| w.owner_id == owner && w.id == id)
    }

    fn account_number_taken(&self, owner: UserId, number: &str, except: Option<WalletId>) -> bool {
        self.wallets.iter().any(|w| {
            w.owner_id == owner && w.account_number == number && Some(w.id) != except
        })
    }
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn list_wallets(&self, owner: UserId) -> Result<Vec<Wallet>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .wallets
            .iter()
            .filter(|w| w.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn find_wallet(
        &self,
        owner: UserId,
        id: WalletId,
    ) -> Result<Option<Wallet>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .wallets
            .iter()
            .find(|w| w.owner_id == owner && w.id == id)
            .cloned())
    }

    async fn insert_wallet(&self, wallet: NewWallet) -> Result<Wallet, LedgerError> {
        let mut state = self.state.lock().await;
        if state.account_number_taken(wallet.owner_id, &wallet.account_number, None) {
            return Err(LedgerError::DuplicateAccountNumber(wallet.account_number));
        }

        let now = Utc::now();
        let stored = Wallet {
            id: WalletId::new(),
            owner_id: wallet.owner_id,
            name: wallet.name,
            account_number: wallet.account_number,
            initial_balance: wallet.initial_balance,
            balance: wallet.initial_balance,
            currency: wallet.currency,
            created_at: now,
            updated_at: now,
        };
        state.wallets.push(stored.clone());
        Ok(stored)
    }

    async fn update_wallet(
        &self,
        owner: UserId,
        id: WalletId,
        changes: WalletChanges,
    ) -> Result<Option<Wallet>, LedgerError> {
        let mut state = self.state.lock().await;
        if let Some(number) = &changes.account_number
            && state.account_number_taken(owner, number, Some(id))
        {
            return Err(LedgerError::DuplicateAccountNumber(number.clone()));
        }

        Ok(state.wallet_mut(owner, id).map(|wallet| {
            if !changes.is_empty() {
                changes.apply_to(wallet);
                wallet.updated_at = Utc::now();
            }
            wallet.clone()
        }))
    }

    async fn delete_wallet(&self, owner: UserId, id: WalletId) -> Result<Option<u64>, LedgerError> {
        let mut state = self.state.lock().await;
        let Some(position) = state
            .wallets
            .iter()
            .position(|w| w.owner_id == owner && w.id == id)
        else {
            return Ok(None);
        };

        let before = state.transactions.len();
        state
            .transactions
            .retain(|t| !(t.owner_id == owner && t.wallet_id == id));
        let removed = before - state.transactions.len();
        state.wallets.remove(position);

        Ok(Some(u64::try_from(removed).unwrap_or(u64::MAX)))
    }

    async fn record_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<RecordedTransaction, LedgerError> {
        let mut state = self.state.lock().await;
        let wallet = state
            .wallet_mut(transaction.owner_id, transaction.wallet_id)
            .ok_or(LedgerError::WalletNotFound(transaction.wallet_id))?;

        let now = Utc::now();
        wallet.balance = book(wallet.balance, transaction.kind, transaction.amount)?;
        wallet.updated_at = now;
        let wallet = wallet.clone();

        let stored = Transaction {
            id: TransactionId::new(),
            owner_id: transaction.owner_id,
            wallet_id: transaction.wallet_id,
            kind: transaction.kind,
            amount: transaction.amount,
            category: transaction.category,
            note: transaction.note,
            occurred_at: transaction.occurred_at,
            created_at: now,
        };
        state.transactions.push(stored.clone());

        Ok(RecordedTransaction {
            transaction: stored,
            wallet,
        })
    }

    async fn remove_transaction(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Option<RemovedTransaction>, LedgerError> {
        let mut state = self.state.lock().await;
        let Some(position) = state
            .transactions
            .iter()
            .position(|t| t.owner_id == owner && t.id == id)
        else {
            return Ok(None);
        };
        let transaction = state.transactions.remove(position);

        let wallet = state
            .wallet_mut(owner, transaction.wallet_id)
            .map(|wallet| {
                wallet.balance =
                    reverse_transaction(wallet.balance, transaction.kind, transaction.amount);
                wallet.updated_at = Utc::now();
                wallet.clone()
            });

        Ok(Some(RemovedTransaction {
            transaction,
            wallet,
        }))
    }

    async fn query_transactions(
        &self,
        owner: UserId,
        filter: &TransactionFilter,
        limit: Limit,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.state.lock().await;
        let mut matching: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.owner_id == owner && filter.matches(t))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        matching.truncate(limit.as_usize());
        Ok(matching)
    }

    async fn sum_by_kind(
        &self,
        owner: UserId,
        wallet_id: Option<WalletId>,
        range: &OccurredRange,
    ) -> Result<KindTotals, LedgerError> {
        let state = self.state.lock().await;
        let filter = TransactionFilter {
            wallet_id,
            kind: None,
            range: *range,
        };
        let mut totals = KindTotals::default();
        for tx in state
            .transactions
            .iter()
            .filter(|t| t.owner_id == owner && filter.matches(t))
        {
            totals.add(tx.kind, tx.amount);
        }
        Ok(totals)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>, AuthError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.external_subject == subject)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AuthError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken(user.email));
        }

        let now = Utc::now();
        let stored = User {
            id: UserId::new(),
            external_subject: user.external_subject,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
        };
        state.users.push(stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        id: UserId,
        display_name: String,
        avatar_url: Option<String>,
    ) -> Result<User, AuthError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AuthError::UserNotFound(id))?;
        user.display_name = display_name;
        user.avatar_url = avatar_url;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
