//! Report request and response types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::WalletId;

/// Parameters of a summary report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryQuery {
    /// Restrict to one wallet; all of the owner's wallets otherwise.
    pub wallet_id: Option<WalletId>,
    /// Inclusive start of the period.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive end of the period.
    pub to: Option<DateTime<Utc>>,
}

/// Opening, flows, and closing balance over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// Wallets the report covers.
    pub wallet_ids: Vec<WalletId>,
    /// Balance just before `from`.
    pub opening_balance: Decimal,
    /// Income inside the period.
    pub total_income: Decimal,
    /// Expense inside the period.
    pub total_expense: Decimal,
    /// `opening + income - expense`.
    pub closing_balance: Decimal,
}
