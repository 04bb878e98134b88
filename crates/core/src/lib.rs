//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the `LedgerStore` and `UserStore` ports.
//!
//! # Modules
//!
//! - `ledger` - Wallets, transactions, and running balances
//! - `reports` - Summary reports rebuilt from transaction history
//! - `auth` - User accounts from verified identities
//! - `memory` - In-memory port implementations (tests and `test-support`)

pub mod auth;
pub mod ledger;
pub mod reports;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
