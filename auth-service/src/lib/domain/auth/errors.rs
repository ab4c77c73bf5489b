use std::fmt;

use thiserror::Error;

use crate::domain::errors::StoreError;
use crate::domain::session::errors::RejectReason;
use crate::domain::user::errors::UserError;
use crate::domain::user::errors::ValidationErrors;

/// Internal reason behind an authentication failure.
///
/// Written to logs only. Callers see one uniform failure regardless of the
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    UnknownAccount,
    WrongPassword,
    InactiveAccount,
    /// Stored password hash could not be parsed.
    UnusableCredential,
    RefreshRejected(RejectReason),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::UnknownAccount => f.write_str("unknown account"),
            AuthFailure::WrongPassword => f.write_str("wrong password"),
            AuthFailure::InactiveAccount => f.write_str("inactive account"),
            AuthFailure::UnusableCredential => f.write_str("unusable stored credential"),
            AuthFailure::RefreshRejected(reason) => write!(f, "refresh token {}", reason),
        }
    }
}

/// Which unique field a registration collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Username => f.write_str("username already taken"),
            ConflictField::Email => f.write_str("email already registered"),
        }
    }
}

/// Caller-facing error taxonomy of the auth service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthServiceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Authentication failed: {0}")]
    Authentication(AuthFailure),

    #[error("Conflict: {0}")]
    Conflict(ConflictField),

    #[error("Dependency unavailable: {0}")]
    Dependency(StoreError),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AuthServiceError {
    fn from(errors: ValidationErrors) -> Self {
        AuthServiceError::Validation(errors)
    }
}

impl From<StoreError> for AuthServiceError {
    fn from(err: StoreError) -> Self {
        AuthServiceError::Dependency(err)
    }
}

impl From<UserError> for AuthServiceError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UsernameAlreadyExists(_) => {
                AuthServiceError::Conflict(ConflictField::Username)
            }
            UserError::EmailAlreadyExists(_) => AuthServiceError::Conflict(ConflictField::Email),
            UserError::Store(e) => AuthServiceError::Dependency(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_mapping() {
        assert_eq!(
            AuthServiceError::from(UserError::EmailAlreadyExists("a@x.com".to_string())),
            AuthServiceError::Conflict(ConflictField::Email)
        );
        assert_eq!(
            AuthServiceError::from(UserError::Store(StoreError::Cancelled("users.create"))),
            AuthServiceError::Dependency(StoreError::Cancelled("users.create"))
        );
    }
}
