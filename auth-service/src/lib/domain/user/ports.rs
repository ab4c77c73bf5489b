use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Persistence of credential records.
///
/// Implementations enforce uniqueness of both username and email. Callers
/// bound every call with a deadline, so implementations need not time out
/// on their own.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new credential record.
    ///
    /// # Arguments
    /// * `user` - Record to create, password already hashed
    ///
    /// # Returns
    /// Created record
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Store` - Storage operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve a record by identifier.
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Retrieve a record by email address (exact match).
    ///
    /// # Errors
    /// * `StoreError` - Storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
