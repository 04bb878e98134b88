//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Authentication middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::{iter::once, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tally_core::{
    auth::{AccountService, UserStore},
    ledger::{LedgerService, LedgerStore},
    reports::ReportService,
};
use tally_shared::{IdentityVerifier, JwtService};
use tower_http::{
    cors::{Any, CorsLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    trace::TraceLayer,
};
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Wallets and transactions.
    pub ledger: LedgerService,
    /// Summary reports.
    pub reports: ReportService,
    /// User accounts.
    pub accounts: AccountService,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Verifies identity tokens on sign-in.
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Builds the services on top of the given stores.
    #[must_use]
    pub fn new(
        ledger_store: Arc<dyn LedgerStore>,
        user_store: Arc<dyn UserStore>,
        jwt_service: Arc<JwtService>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            ledger: LedgerService::new(ledger_store.clone()),
            reports: ReportService::new(ledger_store),
            accounts: AccountService::new(user_store),
            jwt_service,
            identity,
        }
    }
}

/// Builds the CORS layer. An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new(once(header::AUTHORIZATION)))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
