use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::encode;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::JwtError;
use super::PINNED_ALGORITHM;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Signs access tokens.
///
/// The algorithm is fixed at HS256; nothing supplied by the caller can change
/// it. Given identical inputs and clock reading the output is identical.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create a new issuer with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    /// * `issuer` - Value placed in the `iss` claim of every token
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            issuer: issuer.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issue a token for a user, valid from now for `ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        subject: &str,
        username: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(
            subject,
            username,
            email,
            self.issuer.as_str(),
            self.clock.now(),
            ttl,
        );

        self.sign(&claims)
    }

    /// Sign an already built claim set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(PINNED_ALGORITHM);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_is_deterministic_for_fixed_clock() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let issuer = TokenIssuer::new(SECRET, "test-issuer").with_clock(Arc::new(clock));

        let first = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");
        let second = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(first, second);
        assert_eq!(first.split('.').count(), 3);
    }

    #[test]
    fn test_issue_uses_pinned_algorithm() {
        let issuer = TokenIssuer::new(SECRET, "test-issuer");
        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");

        let header = jsonwebtoken::decode_header(&token).expect("Failed to read header");
        assert_eq!(header.alg, PINNED_ALGORITHM);
    }
}
