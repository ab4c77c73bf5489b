use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access token claim set.
///
/// Registered claims (`sub`, `iat`, `exp`, `iss`) plus the identity fields
/// handed to downstream handlers. Timestamps are Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    pub username: String,

    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Build claims valid from `issued_at` for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique user identifier
    /// * `username` - Username carried for downstream handlers
    /// * `email` - Email carried for downstream handlers
    /// * `issuer` - Fixed issuer string of the signing service
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Validity window
    pub fn new(
        subject: impl ToString,
        username: impl Into<String>,
        email: impl Into<String>,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expires_at = issued_at + ttl;

        Self {
            sub: subject.to_string(),
            username: username.into(),
            email: email.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: issuer.into(),
        }
    }

    /// Check whether the token is expired at `current_timestamp`.
    ///
    /// The validity window is half-open: a token whose `exp` equals the
    /// current second is already expired. `leeway_seconds` extends the window
    /// to absorb clock skew between issuer and verifier.
    pub fn is_expired(&self, current_timestamp: i64, leeway_seconds: i64) -> bool {
        self.exp.saturating_add(leeway_seconds) <= current_timestamp
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_sets_window() {
        let claims = Claims::new(
            "user123",
            "alice",
            "alice@example.com",
            "test-issuer",
            issued_at(),
            Duration::hours(24),
        );

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert_eq!(claims.issued_at(), Some(issued_at()));
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::new("u", "alice", "a@x.com", "iss", issued_at(), Duration::seconds(10));
        let exp = claims.exp;

        assert!(!claims.is_expired(exp - 1, 0)); // Not expired
        assert!(claims.is_expired(exp, 0)); // Exactly at expiration
        assert!(claims.is_expired(exp + 1, 0)); // Expired
    }

    #[test]
    fn test_is_expired_with_leeway() {
        let claims = Claims::new("u", "alice", "a@x.com", "iss", issued_at(), Duration::seconds(10));
        let exp = claims.exp;

        assert!(!claims.is_expired(exp + 29, 30));
        assert!(claims.is_expired(exp + 30, 30));
    }
}
