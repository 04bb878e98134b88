//! Storage domain for monetary amounts.
//!
//! Amounts and balances are persisted as `NUMERIC(MONEY_PRECISION, MONEY_SCALE)`.
//! Values outside that domain would be rounded or rejected by the database, so
//! they are refused before any balance arithmetic happens.

use rust_decimal::Decimal;
use thiserror::Error;

/// Total significant digits of a stored amount.
pub const MONEY_PRECISION: u32 = 19;

/// Digits kept after the decimal point.
pub const MONEY_SCALE: u32 = 4;

/// Digits available before the decimal point.
pub const MONEY_INTEGER_DIGITS: u32 = MONEY_PRECISION - MONEY_SCALE;

/// Why an amount falls outside the storage domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyRangeError {
    /// More fractional digits than the column keeps.
    #[error("more than {} decimal places", MONEY_SCALE)]
    TooPrecise,

    /// Magnitude reaches `10^MONEY_INTEGER_DIGITS`.
    #[error("magnitude must be below 10^{}", MONEY_INTEGER_DIGITS)]
    TooLarge,
}

/// SQL column type used for every monetary column.
#[must_use]
pub fn money_sql_type() -> String {
    format!("NUMERIC({MONEY_PRECISION}, {MONEY_SCALE})")
}

/// Smallest magnitude that no longer fits the column.
#[must_use]
pub fn money_upper_bound() -> Decimal {
    Decimal::from(10i64.pow(MONEY_INTEGER_DIGITS))
}

/// Checks that an amount is stored exactly, without rounding or overflow.
///
/// Trailing zeros do not count toward the scale: `1.50000` is accepted.
pub fn check_money(amount: Decimal) -> Result<(), MoneyRangeError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(MoneyRangeError::TooPrecise);
    }
    if amount.abs() >= money_upper_bound() {
        return Err(MoneyRangeError::TooLarge);
    }
    Ok(())
}
