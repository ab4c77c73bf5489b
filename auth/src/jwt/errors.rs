use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are split so they can be logged precisely; callers
/// facing end users are expected to collapse them into one outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature or algorithm is invalid")]
    BadSignature,

    #[error("Token is expired")]
    Expired,
}
