use auth::RefreshSecret;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::unreadable_credentials;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::RefreshOutcome;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let Json(body) = payload.map_err(unreadable_credentials)?;

    state
        .auth_service
        .refresh(RefreshSecret::from_client(body.refresh_token), &state.deadline())
        .await
        .map_err(ApiError::from)
        .map(|outcome| ApiSuccess::new(StatusCode::OK, outcome.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequest {
    refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<RefreshOutcome> for RefreshResponseData {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token.map(RefreshSecret::into_inner),
            token_type: outcome.token_type.to_string(),
            expires_in: outcome.expires_in,
        }
    }
}
