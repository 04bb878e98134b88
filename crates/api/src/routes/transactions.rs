//! Income and expense routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;

use super::{MessageResponse, params::parse_optional_timestamp};
use crate::{AppState, error::ApiError, middleware::AuthUser};
use tally_core::ledger::{
    CreateTransactionInput, LedgerError, OccurredRange, RecordedTransaction, Transaction,
    TransactionFilter, TransactionKind,
};
use tally_shared::types::{TransactionId, WalletId};

/// Creates the transaction routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
}

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Restrict to one wallet.
    pub wallet_id: Option<WalletId>,
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Inclusive lower bound on `occurredAt`.
    pub from: Option<String>,
    /// Inclusive upper bound on `occurredAt`.
    pub to: Option<String>,
}

impl ListTransactionsQuery {
    fn into_filter(self) -> Result<TransactionFilter, ApiError> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<TransactionKind>()
                    .map_err(|_| LedgerError::InvalidKind(raw.to_string()))?,
            ),
        };
        let from = parse_optional_timestamp("from", self.from.as_deref())?;
        let to = parse_optional_timestamp("to", self.to.as_deref())?;

        Ok(TransactionFilter {
            wallet_id: self.wallet_id,
            kind,
            range: OccurredRange::between(from, to),
        })
    }
}

/// GET `/transactions` - Up to 200 matching transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    Ok(Json(
        state
            .ledger
            .list_transactions(auth.user_id(), &filter)
            .await?,
    ))
}

/// POST `/transactions` - Record an income or expense.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateTransactionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordedTransaction>), ApiError> {
    let Json(payload) = payload?;
    let recorded = state
        .ledger
        .create_transaction(auth.user_id(), &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// DELETE `/transactions/{id}` - Delete a transaction and reverse its effect.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    id: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.ledger.delete_transaction(auth.user_id(), id).await?;
    Ok(Json(MessageResponse::new("Transaction deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_query() {
        let query = ListTransactionsQuery {
            kind: Some("Expense".into()),
            from: Some("2025-01-01".into()),
            ..ListTransactionsQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.kind, Some(TransactionKind::Expense));
        assert!(filter.range.from.is_some());
        assert!(filter.range.to.is_none());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let query = ListTransactionsQuery {
            kind: Some("transfer".into()),
            ..ListTransactionsQuery::default()
        };
        assert!(query.into_filter().is_err());
    }
}
