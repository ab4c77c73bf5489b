use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::RefreshSecret;

use crate::domain::auth::errors::AuthFailure;
use crate::domain::auth::errors::AuthServiceError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::RefreshOutcome;
use crate::domain::auth::models::TOKEN_TYPE;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::deadline::Deadline;
use crate::domain::session::errors::SessionError;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::session::service::RefreshTokenManager;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;

/// Domain service implementation for identity and session operations.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<CS, RS>
where
    CS: CredentialStore,
    RS: RefreshTokenStore,
{
    credentials: Arc<CS>,
    sessions: Arc<RefreshTokenManager<RS>>,
    authenticator: Arc<Authenticator>,
    rotation: bool,
}

impl<CS, RS> AuthService<CS, RS>
where
    CS: CredentialStore,
    RS: RefreshTokenStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `credentials` - Credential persistence implementation
    /// * `sessions` - Refresh token lifecycle manager
    /// * `authenticator` - Password hashing and access token issuance
    /// * `rotation` - Whether refresh replaces the presented refresh token
    pub fn new(
        credentials: Arc<CS>,
        sessions: Arc<RefreshTokenManager<RS>>,
        authenticator: Arc<Authenticator>,
        rotation: bool,
    ) -> Self {
        Self {
            credentials,
            sessions,
            authenticator,
            rotation,
        }
    }

    async fn hash_password(&self, password: &Password) -> Result<String, AuthServiceError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.expose().to_string();

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AuthServiceError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AuthServiceError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify off the async workers. Without a stored hash a decoy
    /// verification runs so the timing matches a real account.
    async fn verify_password(
        &self,
        password: &Password,
        stored_hash: Option<String>,
    ) -> Result<bool, AuthServiceError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.expose().to_string();

        let verification = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => authenticator.verify_password(&password, &hash),
            None => {
                if let Err(e) = authenticator.verify_decoy(&password) {
                    tracing::error!("Decoy password verification failed: {}", e);
                }
                Ok(false)
            }
        })
        .await
        .map_err(|e| AuthServiceError::Internal(format!("Verification task failed: {}", e)))?;

        verification.map_err(|e| {
            tracing::error!("Stored password hash is unusable: {}", e);
            reject(AuthFailure::UnusableCredential)
        })
    }

    fn issue_access_token(&self, user: &User) -> Result<(String, i64), AuthServiceError> {
        let result = self
            .authenticator
            .issue_access_token(
                &user.id.to_string(),
                user.username.as_str(),
                user.email.as_str(),
            )
            .map_err(|e| AuthServiceError::Internal(format!("Token signing failed: {}", e)))?;

        Ok((result.access_token, result.expires_in))
    }

    async fn active_user(&self, id: &UserId, deadline: &Deadline) -> Result<User, AuthServiceError> {
        let user = deadline
            .run("users.find_by_id", self.credentials.find_by_id(id))
            .await?
            .ok_or_else(|| reject(AuthFailure::UnknownAccount))?;

        if !user.is_active {
            return Err(reject(AuthFailure::InactiveAccount));
        }

        Ok(user)
    }
}

fn reject(failure: AuthFailure) -> AuthServiceError {
    tracing::warn!(reason = %failure, "Authentication failed");
    AuthServiceError::Authentication(failure)
}

fn session_failure(err: SessionError) -> AuthServiceError {
    match err {
        SessionError::Rejected(reason) => reject(AuthFailure::RefreshRejected(reason)),
        SessionError::Store(e) => AuthServiceError::Dependency(e),
    }
}

#[async_trait]
impl<CS, RS> AuthServicePort for AuthService<CS, RS>
where
    CS: CredentialStore,
    RS: RefreshTokenStore,
{
    async fn register(
        &self,
        command: RegisterCommand,
        deadline: &Deadline,
    ) -> Result<User, AuthServiceError> {
        let password_hash = self.hash_password(&command.password).await?;
        let now = self.authenticator.now();

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            full_name: command.full_name,
            avatar_url: command.avatar_url,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created_user = deadline
            .run("users.create", self.credentials.create(user))
            .await?;

        tracing::info!(user_id = %created_user.id, "Registered user");

        Ok(created_user)
    }

    async fn login(
        &self,
        command: LoginCommand,
        deadline: &Deadline,
    ) -> Result<LoginOutcome, AuthServiceError> {
        let user = deadline
            .run(
                "users.find_by_email",
                self.credentials.find_by_email(&command.email),
            )
            .await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let password_matches = self.verify_password(&command.password, stored_hash).await?;

        let user = user.ok_or_else(|| reject(AuthFailure::UnknownAccount))?;
        if !password_matches {
            return Err(reject(AuthFailure::WrongPassword));
        }
        if !user.is_active {
            return Err(reject(AuthFailure::InactiveAccount));
        }

        let (access_token, expires_in) = self.issue_access_token(&user)?;
        let refresh = self
            .sessions
            .issue(user.id, deadline)
            .await
            .map_err(session_failure)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token: refresh.secret,
            token_type: TOKEN_TYPE,
            expires_in,
        })
    }

    async fn refresh(
        &self,
        refresh_token: RefreshSecret,
        deadline: &Deadline,
    ) -> Result<RefreshOutcome, AuthServiceError> {
        let record = self
            .sessions
            .validate(&refresh_token, deadline)
            .await
            .map_err(session_failure)?;

        let user = self.active_user(&record.user_id, deadline).await?;

        let replacement = if self.rotation {
            let rotated = self
                .sessions
                .rotate(&refresh_token, deadline)
                .await
                .map_err(session_failure)?;
            Some(rotated.secret)
        } else {
            None
        };

        let (access_token, expires_in) = self.issue_access_token(&user)?;

        tracing::debug!(user_id = %user.id, rotated = self.rotation, "Refreshed session");

        Ok(RefreshOutcome {
            access_token,
            refresh_token: replacement,
            token_type: TOKEN_TYPE,
            expires_in,
        })
    }

    async fn logout(
        &self,
        refresh_token: RefreshSecret,
        deadline: &Deadline,
    ) -> Result<(), AuthServiceError> {
        let existed = self.sessions.revoke(&refresh_token, deadline).await?;

        tracing::debug!(existed, "Revoked refresh token");

        Ok(())
    }

    async fn get_user(&self, id: &UserId, deadline: &Deadline) -> Result<User, AuthServiceError> {
        deadline
            .run("users.find_by_id", self.credentials.find_by_id(id))
            .await?
            .ok_or(AuthServiceError::NotFound(id.to_string()))
    }
}
