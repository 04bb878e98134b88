//! History and summary report routes.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;

use super::params::parse_optional_timestamp;
use crate::{AppState, error::ApiError, middleware::AuthUser};
use tally_core::{
    ledger::Transaction,
    reports::{SummaryQuery, SummaryReport},
};
use tally_shared::types::WalletId;

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/history", get(history))
        .route("/reports/summary", get(summary))
}

/// Query parameters for the history report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    /// Restrict to one wallet.
    pub wallet_id: Option<WalletId>,
    /// Number of records, 50 by default, at most 200.
    pub limit: Option<u64>,
}

/// Query parameters for the summary report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    /// Restrict to one wallet.
    pub wallet_id: Option<WalletId>,
    /// Inclusive period start.
    pub from: Option<String>,
    /// Inclusive period end.
    pub to: Option<String>,
}

/// GET `/reports/history` - Most recent transactions.
async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(
        state
            .ledger
            .history(auth.user_id(), params.wallet_id, params.limit)
            .await?,
    ))
}

/// GET `/reports/summary` - Opening, flows, and closing balance for a period.
async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<SummaryReport>, ApiError> {
    let Query(params) = params?;
    let query = SummaryQuery {
        wallet_id: params.wallet_id,
        from: parse_optional_timestamp("from", params.from.as_deref())?,
        to: parse_optional_timestamp("to", params.to.as_deref())?,
    };
    Ok(Json(state.reports.summary(auth.user_id(), query).await?))
}
