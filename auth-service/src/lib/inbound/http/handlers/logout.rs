use auth::RefreshSecret;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::unreadable_credentials;
use super::ApiError;
use crate::inbound::http::router::AppState;

/// Revoke a refresh token. Answers 204 whether or not the token was known.
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload.map_err(unreadable_credentials)?;

    state
        .auth_service
        .logout(RefreshSecret::from_client(body.refresh_token), &state.deadline())
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LogoutRequest {
    refresh_token: String,
}
