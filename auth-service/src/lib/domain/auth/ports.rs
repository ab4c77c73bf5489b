use async_trait::async_trait;
use auth::RefreshSecret;

use crate::domain::auth::errors::AuthServiceError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::RefreshOutcome;
use crate::domain::deadline::Deadline;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for identity and session operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Validated registration input
    /// * `deadline` - Bound on store calls
    ///
    /// # Returns
    /// Created user
    ///
    /// # Errors
    /// * `Conflict` - Username or email already registered
    /// * `Dependency` - Store unavailable, timed out or cancelled
    /// * `Internal` - Password hashing failed
    async fn register(
        &self,
        command: RegisterCommand,
        deadline: &Deadline,
    ) -> Result<User, AuthServiceError>;

    /// Exchange email and password for an access and a refresh token.
    ///
    /// # Errors
    /// * `Authentication` - Any credential problem (reason for logs only)
    /// * `Dependency` - Store unavailable, timed out or cancelled
    /// * `Internal` - Token signing failed
    async fn login(
        &self,
        command: LoginCommand,
        deadline: &Deadline,
    ) -> Result<LoginOutcome, AuthServiceError>;

    /// Exchange a refresh token for a new access token, rotating the refresh
    /// token when rotation is enabled.
    ///
    /// # Errors
    /// * `Authentication` - Unknown, revoked or expired token, or inactive account
    /// * `Dependency` - Store unavailable, timed out or cancelled
    async fn refresh(
        &self,
        refresh_token: RefreshSecret,
        deadline: &Deadline,
    ) -> Result<RefreshOutcome, AuthServiceError>;

    /// Revoke a refresh token. Unknown tokens are not an error.
    ///
    /// # Errors
    /// * `Dependency` - Store unavailable, timed out or cancelled
    async fn logout(
        &self,
        refresh_token: RefreshSecret,
        deadline: &Deadline,
    ) -> Result<(), AuthServiceError>;

    /// Retrieve a user by identifier.
    ///
    /// # Errors
    /// * `NotFound` - No such user
    /// * `Dependency` - Store unavailable, timed out or cancelled
    async fn get_user(&self, id: &UserId, deadline: &Deadline) -> Result<User, AuthServiceError>;
}
