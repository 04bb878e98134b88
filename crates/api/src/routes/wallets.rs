//! Wallet management routes.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, patch},
};

use super::MessageResponse;
use crate::{AppState, error::ApiError, middleware::AuthUser};
use tally_core::ledger::{CreateWalletInput, UpdateWalletInput, Wallet};
use tally_shared::types::WalletId;

/// Creates the wallet routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets).post(create_wallet))
        .route("/wallets/{id}", patch(update_wallet).delete(delete_wallet))
}

/// GET `/wallets` - The caller's wallets, oldest first.
async fn list_wallets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Wallet>>, ApiError> {
    Ok(Json(state.ledger.list_wallets(auth.user_id()).await?))
}

/// POST `/wallets` - Create a wallet.
async fn create_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateWalletInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Wallet>), ApiError> {
    let Json(payload) = payload?;
    let wallet = state.ledger.create_wallet(auth.user_id(), &payload).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

/// PATCH `/wallets/{id}` - Rename or re-number a wallet.
async fn update_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<WalletId>, PathRejection>,
    payload: Result<Json<UpdateWalletInput>, JsonRejection>,
) -> Result<Json<Wallet>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    Ok(Json(
        state
            .ledger
            .update_wallet(auth.user_id(), id, &payload)
            .await?,
    ))
}

/// DELETE `/wallets/{id}` - Delete a wallet and its transactions.
async fn delete_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<WalletId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    let removed = state.ledger.delete_wallet(auth.user_id(), id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Wallet deleted with {removed} transaction(s)"
    ))))
}
