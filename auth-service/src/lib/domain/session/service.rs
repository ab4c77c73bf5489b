use std::sync::Arc;

use auth::Clock;
use auth::RefreshSecret;
use chrono::Duration;

use crate::domain::deadline::Deadline;
use crate::domain::errors::StoreError;
use crate::domain::session::errors::RejectReason;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::IssuedRefreshToken;
use crate::domain::session::models::RefreshToken;
use crate::domain::session::models::RefreshTokenState;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::user::models::UserId;

/// Lifecycle of refresh tokens over a [`RefreshTokenStore`].
///
/// States are `Active`, `Revoked` and `Expired`; the last two are terminal.
/// Every store call is bounded by the caller's [`Deadline`].
pub struct RefreshTokenManager<RS>
where
    RS: RefreshTokenStore,
{
    store: Arc<RS>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    retention: Duration,
}

impl<RS> RefreshTokenManager<RS>
where
    RS: RefreshTokenStore,
{
    /// Create a manager.
    ///
    /// # Arguments
    /// * `store` - Refresh token persistence
    /// * `clock` - Time source shared with the token verifier
    /// * `ttl` - Lifetime of newly issued tokens
    /// * `retention` - How long expired records are kept before cleanup
    pub fn new(store: Arc<RS>, clock: Arc<dyn Clock>, ttl: Duration, retention: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            retention,
        }
    }

    /// Issue a new refresh token for `user_id`.
    ///
    /// # Returns
    /// The raw secret (to hand to the client once) and the stored record
    ///
    /// # Errors
    /// * `Store` - Storage failed, timed out or was cancelled
    pub async fn issue(
        &self,
        user_id: UserId,
        deadline: &Deadline,
    ) -> Result<IssuedRefreshToken, SessionError> {
        let (secret, record) = self.new_record(user_id);

        deadline
            .run("refresh_token.insert", self.store.insert(record.clone()))
            .await?;

        tracing::debug!(user_id = %user_id, token_id = %record.id, "Issued refresh token");

        Ok(IssuedRefreshToken { secret, record })
    }

    /// Check a presented secret without changing any state.
    ///
    /// # Returns
    /// The active record
    ///
    /// # Errors
    /// * `Rejected` - Unknown, revoked or expired token
    /// * `Store` - Storage failed, timed out or was cancelled
    pub async fn validate(
        &self,
        secret: &RefreshSecret,
        deadline: &Deadline,
    ) -> Result<RefreshToken, SessionError> {
        let record = deadline
            .run(
                "refresh_token.find_by_hash",
                self.store.find_by_hash(&secret.digest()),
            )
            .await?
            .ok_or(SessionError::Rejected(RejectReason::NotFound))?;

        match record.state(self.clock.now()) {
            RefreshTokenState::Active => Ok(record),
            RefreshTokenState::Revoked => Err(SessionError::Rejected(RejectReason::Revoked)),
            RefreshTokenState::Expired => Err(SessionError::Rejected(RejectReason::Expired)),
        }
    }

    /// Exchange a valid token for a new one, revoking the old one.
    ///
    /// Single use: once a rotation of `secret` has succeeded, every further
    /// attempt fails with `Rejected(Revoked)`, including concurrent ones
    /// that lost the race.
    ///
    /// # Errors
    /// * `Rejected` - Unknown, revoked or expired token
    /// * `Store` - Storage failed, timed out or was cancelled
    pub async fn rotate(
        &self,
        secret: &RefreshSecret,
        deadline: &Deadline,
    ) -> Result<IssuedRefreshToken, SessionError> {
        let current = self.validate(secret, deadline).await?;
        let (replacement_secret, replacement) = self.new_record(current.user_id);

        let rotated = deadline
            .run(
                "refresh_token.rotate",
                self.store
                    .rotate(&current.token_hash, replacement.clone(), self.clock.now()),
            )
            .await?;

        if !rotated {
            return Err(SessionError::Rejected(RejectReason::Revoked));
        }

        tracing::debug!(
            user_id = %current.user_id,
            old_token_id = %current.id,
            new_token_id = %replacement.id,
            "Rotated refresh token"
        );

        Ok(IssuedRefreshToken {
            secret: replacement_secret,
            record: replacement,
        })
    }

    /// Revoke a token unconditionally.
    ///
    /// # Returns
    /// `true` if a record for this secret existed
    ///
    /// # Errors
    /// * `StoreError` - Storage failed, timed out or was cancelled
    pub async fn revoke(
        &self,
        secret: &RefreshSecret,
        deadline: &Deadline,
    ) -> Result<bool, StoreError> {
        deadline
            .run(
                "refresh_token.revoke",
                self.store.revoke(&secret.digest(), self.clock.now()),
            )
            .await
    }

    /// Delete records that expired more than the retention window ago.
    ///
    /// Idempotent: a second run right after the first deletes nothing.
    ///
    /// # Returns
    /// Number of records deleted
    ///
    /// # Errors
    /// * `StoreError` - Storage failed, timed out or was cancelled
    pub async fn cleanup_expired(&self, deadline: &Deadline) -> Result<u64, StoreError> {
        let cutoff = self.clock.now() - self.retention;

        deadline
            .run("refresh_token.delete_expired", self.store.delete_expired(cutoff))
            .await
    }

    fn new_record(&self, user_id: UserId) -> (RefreshSecret, RefreshToken) {
        let secret = RefreshSecret::generate();
        let record = RefreshToken::new(user_id, secret.digest(), self.clock.now(), self.ttl);
        (secret, record)
    }
}
