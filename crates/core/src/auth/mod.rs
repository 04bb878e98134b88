//! User accounts backed by an external identity provider.
//!
//! This module provides:
//! - The `User` record and the `UserStore` persistence port
//! - Sign-in: create-or-refresh a user from a verified identity

pub mod error;
pub mod service;
pub mod types;

pub use error::AuthError;
pub use service::{AccountService, UserStore};
pub use types::{NewUser, User};
