use std::sync::Arc;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenVerifier;
use crate::password::PasswordCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Default access token validity window.
pub const DEFAULT_ACCESS_TOKEN_TTL_HOURS: i64 = 24;

/// Password used to build the decoy hash for unknown accounts.
const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Authentication coordinator combining password verification and JWT generation.
///
/// Holds only immutable state (keys, cost, ttl) and is shared across request
/// tasks behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    token_verifier: TokenVerifier,
    access_token_ttl: Duration,
    clock: Arc<dyn Clock>,
    decoy_hash: OnceLock<String>,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `issuer` - Issuer written into and required from every token
    ///
    /// # Returns
    /// Authenticator with default Argon2 cost, 24h access tokens, zero leeway
    pub fn new(jwt_secret: &[u8], issuer: &str) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_issuer: TokenIssuer::new(jwt_secret, issuer),
            token_verifier: TokenVerifier::new(jwt_secret, issuer),
            access_token_ttl: Duration::hours(DEFAULT_ACCESS_TOKEN_TTL_HOURS),
            clock: Arc::new(SystemClock),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Use an explicit Argon2 work factor.
    ///
    /// # Errors
    /// * `InvalidCost` - Parameters rejected by Argon2
    pub fn with_password_cost(mut self, cost: PasswordCost) -> Result<Self, PasswordError> {
        self.password_hasher = PasswordHasher::with_cost(cost)?;
        Ok(self)
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Tolerate `seconds` of clock skew when checking expiry.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.token_verifier = self.token_verifier.with_leeway(seconds);
        self
    }

    /// Replace the time source of issuer, verifier, and [`Authenticator::now`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.token_issuer = self.token_issuer.with_clock(Arc::clone(&clock));
        self.token_verifier = self.token_verifier.with_clock(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash is corrupt
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Spend one verification on a decoy hash.
    ///
    /// Called when no account matches so that the response time of a failed
    /// login does not reveal whether the account exists. The decoy is hashed
    /// with the configured cost on first use.
    ///
    /// # Errors
    /// * `PasswordError` - The decoy hash could not be built or checked
    pub fn verify_decoy(&self, password: &str) -> Result<(), PasswordError> {
        let hash = match self.decoy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.password_hasher.hash(DECOY_PASSWORD)?;
                self.decoy_hash.get_or_init(|| hash)
            }
        };

        self.password_hasher.verify(password, hash).map(|_| ())
    }

    /// Generate an access token for an identity the caller has already
    /// established (password at login, refresh token on refresh).
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_access_token(
        &self,
        subject: &str,
        username: &str,
        email: &str,
    ) -> Result<AuthenticationResult, JwtError> {
        let access_token =
            self.token_issuer
                .issue(subject, username, email, self.access_token_ttl)?;

        Ok(AuthenticationResult {
            access_token,
            expires_in: self.access_token_ttl.num_seconds(),
        })
    }

    /// Validate and decode an access token.
    ///
    /// # Errors
    /// * `Malformed`, `BadSignature`, `Expired`
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_verifier.verify(token)
    }
}
