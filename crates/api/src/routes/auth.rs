//! Authentication routes: identity-token sign-in and current profile.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use tally_shared::auth::{GoogleSignInRequest, SignInResponse, UserInfo};

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/google", post(google_sign_in))
}

/// Auth routes that require a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// POST `/auth/google` - Exchange an identity token for a session token.
async fn google_sign_in(
    State(state): State<AppState>,
    payload: Result<Json<GoogleSignInRequest>, JsonRejection>,
) -> Result<Json<SignInResponse>, ApiError> {
    let Json(payload) = payload?;

    let identity = state.identity.verify(&payload.id_token).await?;
    let user = state.accounts.sign_in(&identity).await?;
    let token = state
        .jwt_service
        .generate_access_token(user.id, &user.email, &user.display_name)?;

    info!(user_id = %user.id, "user signed in");
    Ok(Json(SignInResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// GET `/auth/me` - Profile of the authenticated user.
async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserInfo>, ApiError> {
    let user = state.accounts.profile(auth.user_id()).await?;
    Ok(Json(UserInfo::from(&user)))
}
