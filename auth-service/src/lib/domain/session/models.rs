use std::fmt;

use auth::RefreshSecret;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Refresh token record unique identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTokenId(pub Uuid);

impl RefreshTokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RefreshTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Persisted refresh token.
///
/// Only the SHA-256 digest of the secret is stored. `revoked` never goes
/// back to false once set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Fresh active record for `user_id` valid for `ttl` from `now`.
    pub fn new(user_id: UserId, token_hash: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: RefreshTokenId::new(),
            user_id,
            token_hash,
            expires_at: now + ttl,
            revoked: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lifecycle state at `now`.
    ///
    /// Revocation wins over expiry. A record expiring exactly at `now` is
    /// already expired.
    pub fn state(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked {
            RefreshTokenState::Revoked
        } else if self.expires_at <= now {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == RefreshTokenState::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    /// Derived from `expires_at`, never stored.
    Expired,
}

/// Result of issuing a refresh token: the raw secret for the client and the
/// record that was stored.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub secret: RefreshSecret,
    pub record: RefreshToken,
}
