use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::StoreError;
use crate::domain::session::models::RefreshToken;

/// Persistence of refresh token records, keyed by secret digest.
///
/// `rotate` and `revoke` must be atomic at the storage layer, including
/// across several service instances sharing one store.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Persist a new record.
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn insert(&self, token: RefreshToken) -> Result<(), StoreError>;

    /// Retrieve a record by secret digest.
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Revoke the record for `old_hash` and insert `replacement` as one
    /// indivisible operation.
    ///
    /// The transition happens only if the old record exists, belongs to
    /// `replacement.user_id`, is not revoked and has not expired at `now`.
    ///
    /// # Returns
    /// `true` if this call performed the transition, `false` if the old
    /// record was not in a rotatable state (nothing is written)
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Mark the record revoked regardless of its current state.
    ///
    /// # Returns
    /// `true` if a record with this digest exists
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Delete every record whose expiry is at or before `cutoff`.
    ///
    /// # Returns
    /// Number of records deleted
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
