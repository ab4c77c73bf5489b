use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::auth::errors::AuthServiceError;
use crate::domain::user::errors::ValidationErrors;
use crate::domain::user::models::User;

pub mod current_user;
pub mod get_user;
pub mod health;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod session;

/// Message of every authentication failure response.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Caller-facing error. Only these messages ever leave the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError,
    UnprocessableEntity {
        message: String,
        fields: Vec<FieldErrorData>,
    },
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized,
    ServiceUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data) = match self {
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorData::message("Internal server error"),
            ),
            ApiError::UnprocessableEntity { message, fields } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorData {
                    message,
                    fields: Some(fields),
                },
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiErrorData::message(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiErrorData::message(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ApiErrorData::message(msg)),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorData::message(AUTHENTICATION_FAILED),
            ),
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorData::message("Service temporarily unavailable"),
            ),
        };

        (status, Json(ApiResponseBody::new(status, data))).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::UnprocessableEntity {
            message: "Validation failed".to_string(),
            fields: errors
                .violations()
                .iter()
                .map(|v| FieldErrorData {
                    field: v.field.to_string(),
                    message: v.message.clone(),
                })
                .collect(),
        }
    }
}

/// Unreadable bodies on credential endpoints fail like bad credentials.
///
/// The parser message is logged and never returned.
pub fn unreadable_credentials(rejection: JsonRejection) -> ApiError {
    tracing::warn!(reason = %rejection.body_text(), "Authentication failed");
    ApiError::Unauthorized
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::UnprocessableEntity {
            message: "Invalid request body".to_string(),
            fields: Vec::new(),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Validation(errors) => ApiError::from(errors),
            AuthServiceError::Authentication(_) => ApiError::Unauthorized,
            AuthServiceError::Conflict(field) => ApiError::Conflict(field.to_string()),
            AuthServiceError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            AuthServiceError::Dependency(e) => {
                tracing::error!("Dependency failure: {}", e);
                ApiError::ServiceUnavailable
            }
            AuthServiceError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldErrorData>>,
}

impl ApiErrorData {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldErrorData {
    pub field: String,
    pub message: String,
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            full_name: user.full_name.as_ref().map(|n| n.as_str().to_string()),
            avatar_url: user.avatar_url.as_ref().map(|u| u.as_str().to_string()),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::errors::AuthFailure;
    use crate::domain::errors::StoreError;
    use crate::domain::session::errors::RejectReason;

    #[test]
    fn test_authentication_failures_are_uniform() {
        let failures = [
            AuthFailure::UnknownAccount,
            AuthFailure::WrongPassword,
            AuthFailure::InactiveAccount,
            AuthFailure::RefreshRejected(RejectReason::Revoked),
        ];

        for failure in failures {
            assert_eq!(
                ApiError::from(AuthServiceError::Authentication(failure)),
                ApiError::Unauthorized
            );
        }
    }

    #[test]
    fn test_dependency_detail_is_stripped() {
        let err = ApiError::from(AuthServiceError::Dependency(StoreError::Database(
            "password authentication failed for user postgres".to_string(),
        )));

        assert_eq!(err, ApiError::ServiceUnavailable);
    }
}
