//! Wallet balance arithmetic.
//!
//! Every store implementation funnels balance changes through these
//! functions so the materialized balance always follows the same rules.

use rust_decimal::Decimal;
use tally_shared::types::check_money;
use tracing::warn;

use super::error::LedgerError;
use super::types::TransactionKind;

/// Signed effect of a transaction on its wallet.
#[must_use]
pub fn signed_amount(kind: TransactionKind, amount: Decimal) -> Decimal {
    match kind {
        TransactionKind::Income => amount,
        TransactionKind::Expense => -amount,
    }
}

/// Balance after booking a transaction. `amount` is already validated positive.
#[must_use]
pub fn apply_transaction(balance: Decimal, kind: TransactionKind, amount: Decimal) -> Decimal {
    balance + signed_amount(kind, amount)
}

/// Balance after undoing a transaction, floored at zero.
///
/// A result below zero means the stored balance had drifted from the
/// transaction history; the floor keeps the wallet valid and the event is logged.
#[must_use]
pub fn reverse_transaction(balance: Decimal, kind: TransactionKind, amount: Decimal) -> Decimal {
    let reversed = balance - signed_amount(kind, amount);
    if reversed.is_sign_negative() && !reversed.is_zero() {
        warn!(
            %balance,
            %amount,
            kind = %kind,
            unclamped = %reversed,
            "reversal would drive wallet balance negative, clamping to zero"
        );
        return Decimal::ZERO;
    }
    reversed
}

/// Rejects an expense larger than the current balance.
///
/// Spending exactly the balance is allowed. Income always passes.
pub fn ensure_sufficient_funds(
    balance: Decimal,
    kind: TransactionKind,
    amount: Decimal,
) -> Result<(), LedgerError> {
    if kind == TransactionKind::Expense && amount > balance {
        return Err(LedgerError::InsufficientFunds {
            balance,
            requested: amount,
        });
    }
    Ok(())
}

/// Checks the funds guard and returns the new balance in one step.
///
/// Income that would leave the balance outside the storable range is refused.
pub fn book(balance: Decimal, kind: TransactionKind, amount: Decimal) -> Result<Decimal, LedgerError> {
    ensure_sufficient_funds(balance, kind, amount)?;
    let booked = apply_transaction(balance, kind, amount);
    if check_money(booked).is_err() {
        return Err(LedgerError::BalanceOutOfRange {
            balance,
            requested: amount,
        });
    }
    Ok(booked)
}
