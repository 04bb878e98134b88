//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Currency codes, the money storage domain, and list limits
//! - Application-wide error types
//! - Configuration management
//! - JWT sessions and identity verification

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use identity::{
    DevIdentityVerifier, GoogleIdentityVerifier, IdentityError, IdentityVerifier, VerifiedIdentity,
};
pub use jwt::{JwtConfig, JwtError, JwtService};
