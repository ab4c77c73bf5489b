//! Authentication utilities library
//!
//! Storage-free building blocks for the identity service:
//! - Password hashing (Argon2id)
//! - Access token issuance and verification (JWT, HS256 only)
//! - Refresh token secret generation and digesting
//! - Authentication coordination
//!
//! Nothing here touches a database; persistence belongs to the service that
//! adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{TokenIssuer, TokenVerifier};
//! use chrono::Duration;
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let issuer = TokenIssuer::new(secret, "my-service");
//! let verifier = TokenVerifier::new(secret, "my-service");
//!
//! let token = issuer.issue("user123", "alice", "alice@example.com", Duration::hours(1)).unwrap();
//! let claims = verifier.verify(&token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", "my-service");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify, then generate token
//! assert!(auth.verify_password("password123", &hash).unwrap());
//! let result = auth
//!     .issue_access_token("user123", "alice", "alice@example.com")
//!     .unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;
pub mod refresh;

// Re-export commonly used items
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::PasswordCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use refresh::RefreshSecret;
