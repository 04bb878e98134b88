//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! [`DbStore`] bundles them behind the core persistence ports.

pub mod store;
pub mod transaction;
pub mod user;
pub mod wallet;

pub use store::DbStore;
pub use transaction::{TransactionError, TransactionRepository};
pub use user::{UserError, UserRepository};
pub use wallet::{WalletError, WalletRepository};
