use std::fmt;

use thiserror::Error;

use crate::domain::errors::StoreError;

/// Why a refresh token was refused. Logged, never returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotFound,
    Revoked,
    Expired,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::NotFound => "not found",
            RejectReason::Revoked => "revoked",
            RejectReason::Expired => "expired",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Refresh token rejected: {0}")]
    Rejected(RejectReason),

    #[error(transparent)]
    Store(#[from] StoreError),
}
