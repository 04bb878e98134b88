//! Domain types for wallets and transactions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CurrencyCode, TransactionId, UserId, WalletId};

/// Direction of a transaction. The amount is always positive; the kind
/// decides whether it adds to or subtracts from the wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming into the wallet.
    Income,
    /// Money leaving the wallet.
    Expense,
}

impl TransactionKind {
    /// Lower-case wire and storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// A cash or bank account with a materialized running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Wallet ID.
    pub id: WalletId,
    /// Owning user.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Account number, unique per owner.
    pub account_number: String,
    /// Balance the wallet was opened with. Never changes.
    pub initial_balance: Decimal,
    /// Current balance: initial plus income minus expense.
    pub balance: Decimal,
    /// Currency label.
    pub currency: CurrencyCode,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// An immutable income or expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub owner_id: UserId,
    /// Wallet the transaction was booked against.
    pub wallet_id: WalletId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Free-form category label.
    pub category: String,
    /// Optional note.
    pub note: Option<String>,
    /// When the money moved.
    pub occurred_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Raw input for creating a wallet, as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletInput {
    /// Display name.
    pub name: Option<String>,
    /// Account number.
    pub account_number: Option<String>,
    /// Opening balance, zero when absent.
    pub initial_balance: Option<Decimal>,
    /// Currency code, `VND` when absent.
    pub currency: Option<String>,
}

/// Raw input for updating a wallet. Absent or blank fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalletInput {
    /// New display name.
    pub name: Option<String>,
    /// New account number.
    pub account_number: Option<String>,
    /// New currency code.
    pub currency: Option<String>,
}

/// Raw input for recording a transaction, as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionInput {
    /// Target wallet.
    pub wallet_id: Option<WalletId>,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Amount, must be positive.
    pub amount: Option<Decimal>,
    /// Category label.
    pub category: Option<String>,
    /// Optional note.
    pub note: Option<String>,
    /// When the money moved, defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A validated wallet ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWallet {
    /// Owning user.
    pub owner_id: UserId,
    /// Display name.
    pub name: String,
    /// Account number.
    pub account_number: String,
    /// Opening balance, never negative.
    pub initial_balance: Decimal,
    /// Currency label.
    pub currency: CurrencyCode,
}

/// Validated changes to apply to a wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletChanges {
    /// New display name.
    pub name: Option<String>,
    /// New account number.
    pub account_number: Option<String>,
    /// New currency.
    pub currency: Option<CurrencyCode>,
}

impl WalletChanges {
    /// True when nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.account_number.is_none() && self.currency.is_none()
    }

    /// Applies the changes to `wallet`.
    pub fn apply_to(&self, wallet: &mut Wallet) {
        if let Some(name) = &self.name {
            wallet.name.clone_from(name);
        }
        if let Some(account_number) = &self.account_number {
            wallet.account_number.clone_from(account_number);
        }
        if let Some(currency) = &self.currency {
            wallet.currency = currency.clone();
        }
    }
}

/// A validated transaction ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owning user.
    pub owner_id: UserId,
    /// Target wallet.
    pub wallet_id: WalletId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Trimmed, non-empty category.
    pub category: String,
    /// Optional note.
    pub note: Option<String>,
    /// When the money moved.
    pub occurred_at: DateTime<Utc>,
}

/// End of an occurred-at range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// `occurred_at <= t`
    Inclusive(DateTime<Utc>),
    /// `occurred_at < t`
    Exclusive(DateTime<Utc>),
}

/// Range over `occurred_at`. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurredRange {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Upper bound.
    pub to: Option<RangeEnd>,
}

impl OccurredRange {
    /// `[from, to]`, both inclusive.
    #[must_use]
    pub const fn between(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        let to = match to {
            Some(t) => Some(RangeEnd::Inclusive(t)),
            None => None,
        };
        Self { from, to }
    }

    /// Everything strictly before `t`.
    #[must_use]
    pub const fn before(t: DateTime<Utc>) -> Self {
        Self {
            from: None,
            to: Some(RangeEnd::Exclusive(t)),
        }
    }

    /// Whether `at` falls inside the range.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let after_start = self.from.is_none_or(|from| at >= from);
        let before_end = match self.to {
            None => true,
            Some(RangeEnd::Inclusive(t)) => at <= t,
            Some(RangeEnd::Exclusive(t)) => at < t,
        };
        after_start && before_end
    }
}

/// Filter for listing transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Restrict to one wallet.
    pub wallet_id: Option<WalletId>,
    /// Restrict to one kind.
    pub kind: Option<TransactionKind>,
    /// Restrict by `occurred_at`.
    pub range: OccurredRange,
}

impl TransactionFilter {
    /// Whether `tx` passes every criterion (ownership is checked separately).
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.wallet_id.is_none_or(|id| tx.wallet_id == id)
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && self.range.contains(tx.occurred_at)
    }
}

/// Income and expense sums over some set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTotals {
    /// Sum of income amounts.
    pub income: Decimal,
    /// Sum of expense amounts.
    pub expense: Decimal,
}

impl KindTotals {
    /// Adds one transaction amount to the matching side.
    pub fn add(&mut self, kind: TransactionKind, amount: Decimal) {
        match kind {
            TransactionKind::Income => self.income += amount,
            TransactionKind::Expense => self.expense += amount,
        }
    }

    /// Income minus expense.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Result of recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedTransaction {
    /// The stored transaction.
    pub transaction: Transaction,
    /// The wallet after the balance change.
    pub wallet: Wallet,
}

/// Result of deleting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedTransaction {
    /// The deleted transaction.
    pub transaction: Transaction,
    /// The wallet after reversal, `None` if it no longer exists.
    pub wallet: Option<Wallet>,
}
