//! Input validation for wallets and transactions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{CurrencyCode, UserId, check_money};

use super::error::LedgerError;
use super::types::{
    CreateTransactionInput, CreateWalletInput, NewTransaction, NewWallet, TransactionKind,
    UpdateWalletInput, WalletChanges,
};

/// Returns the trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, LedgerError> {
    non_blank(value).ok_or(LedgerError::MissingField(field))
}

/// Rejects values the money columns would round or overflow.
fn storable(amount: Decimal, field: &'static str) -> Result<Decimal, LedgerError> {
    check_money(amount).map_err(|reason| LedgerError::UnstorableAmount { field, reason })?;
    Ok(amount)
}

fn parse_currency(raw: &str) -> Result<CurrencyCode, LedgerError> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidCurrency(raw.to_string()))
}

/// Validates a wallet creation request.
pub fn validate_new_wallet(
    owner_id: UserId,
    input: &CreateWalletInput,
) -> Result<NewWallet, LedgerError> {
    let name = required(input.name.as_deref(), "name")?;
    let account_number = required(input.account_number.as_deref(), "accountNumber")?;

    let initial_balance = input.initial_balance.unwrap_or(Decimal::ZERO);
    if initial_balance.is_sign_negative() && !initial_balance.is_zero() {
        return Err(LedgerError::NegativeInitialBalance);
    }
    let initial_balance = storable(initial_balance, "initialBalance")?;

    let currency = match non_blank(input.currency.as_deref()) {
        Some(raw) => parse_currency(&raw)?,
        None => CurrencyCode::default(),
    };

    Ok(NewWallet {
        owner_id,
        name,
        account_number,
        initial_balance,
        currency,
    })
}

/// Validates a wallet update request. Blank fields are ignored.
pub fn validate_wallet_changes(input: &UpdateWalletInput) -> Result<WalletChanges, LedgerError> {
    let currency = non_blank(input.currency.as_deref())
        .map(|raw| parse_currency(&raw))
        .transpose()?;

    Ok(WalletChanges {
        name: non_blank(input.name.as_deref()),
        account_number: non_blank(input.account_number.as_deref()),
        currency,
    })
}

/// Validates a transaction creation request.
///
/// `now` becomes the occurrence time when the client did not supply one.
pub fn validate_new_transaction(
    owner_id: UserId,
    input: &CreateTransactionInput,
    now: DateTime<Utc>,
) -> Result<NewTransaction, LedgerError> {
    let wallet_id = input.wallet_id.ok_or(LedgerError::MissingField("walletId"))?;

    let raw_kind = required(input.kind.as_deref(), "type")?;
    let kind: TransactionKind = raw_kind
        .parse()
        .map_err(|_| LedgerError::InvalidKind(raw_kind.clone()))?;

    let amount = input.amount.ok_or(LedgerError::MissingField("amount"))?;
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount);
    }
    let amount = storable(amount, "amount")?;

    let category = required(input.category.as_deref(), "category")?;

    Ok(NewTransaction {
        owner_id,
        wallet_id,
        kind,
        amount,
        category,
        note: non_blank(input.note.as_deref()),
        occurred_at: input.occurred_at.unwrap_or(now),
    })
}
