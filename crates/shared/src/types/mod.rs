//! Common types used across the application.

pub mod currency;
pub mod id;
pub mod limit;
pub mod money;

pub use currency::{CurrencyCode, DEFAULT_CURRENCY};
pub use id::*;
pub use limit::{Limit, MAX_LIMIT};
pub use money::{
    MONEY_INTEGER_DIGITS, MONEY_PRECISION, MONEY_SCALE, MoneyRangeError, check_money,
    money_sql_type, money_upper_bound,
};
