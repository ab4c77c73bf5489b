use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Report who, if anyone, the bearer token identifies.
pub async fn session(
    identity: Option<Extension<AuthenticatedUser>>,
) -> ApiSuccess<SessionResponseData> {
    let user = identity.map(|Extension(user)| SessionUserData {
        subject_id: user.user_id.to_string(),
        username: user.username,
        email: user.email,
    });

    ApiSuccess::new(
        StatusCode::OK,
        SessionResponseData {
            authenticated: user.is_some(),
            user,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub authenticated: bool,
    pub user: Option<SessionUserData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUserData {
    pub subject_id: String,
    pub username: String,
    pub email: String,
}
