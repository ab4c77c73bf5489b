use std::fmt;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Identity attached to the request by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// Why the gate refused a request. Logged only.
#[derive(Debug)]
enum GateRejection {
    InvalidHeader,
    NotBearer,
    InvalidToken(auth::JwtError),
    InvalidSubject,
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::InvalidHeader => f.write_str("authorization header is not valid text"),
            GateRejection::NotBearer => f.write_str("authorization header is not a bearer credential"),
            GateRejection::InvalidToken(e) => write!(f, "{}", e),
            GateRejection::InvalidSubject => f.write_str("token subject is not a user id"),
        }
    }
}

/// Require a valid bearer token and expose the identity to handlers.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    match identify(&state, &req) {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Ok(None) => {
            tracing::warn!("Rejected request: missing Authorization header");
            Err(ApiError::Unauthorized.into_response())
        }
        Err(rejection) => {
            tracing::warn!("Rejected request: {}", rejection);
            Err(ApiError::Unauthorized.into_response())
        }
    }
}

/// Like [`authenticate`], but a request without an Authorization header
/// proceeds anonymously. A header that is present must still be valid.
pub async fn authenticate_optional(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    match identify(&state, &req) {
        Ok(identity) => {
            if let Some(user) = identity {
                req.extensions_mut().insert(user);
            }
            Ok(next.run(req).await)
        }
        Err(rejection) => {
            tracing::warn!("Rejected request: {}", rejection);
            Err(ApiError::Unauthorized.into_response())
        }
    }
}

fn identify(state: &AppState, req: &Request) -> Result<Option<AuthenticatedUser>, GateRejection> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| GateRejection::InvalidHeader)?;
    let token = header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(GateRejection::NotBearer)?;

    let claims = state
        .authenticator
        .validate_token(token)
        .map_err(GateRejection::InvalidToken)?;

    let user_id = UserId::from_string(&claims.sub).map_err(|_| GateRejection::InvalidSubject)?;

    Ok(Some(AuthenticatedUser {
        user_id,
        username: claims.username,
        email: claims.email,
    }))
}
