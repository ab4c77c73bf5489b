use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::PINNED_ALGORITHM;
use crate::clock::Clock;
use crate::clock::SystemClock;

/// Verifies access tokens.
///
/// Pure function of (secret, token, now): signature and algorithm are
/// checked by `jsonwebtoken` against the single pinned algorithm, expiry is
/// checked here against the injected clock so the boundary is exact.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Create a verifier accepting only HS256 tokens from `issuer`.
    ///
    /// Clock skew tolerance is zero until [`TokenVerifier::with_leeway`] is
    /// called.
    pub fn new(secret: &[u8], issuer: &str) -> Self {
        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.algorithms = vec![PINNED_ALGORITHM];
        // Expiry is enforced in `verify` with a strict boundary.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["exp", "iat", "sub", "iss"]
            .into_iter()
            .map(String::from)
            .collect::<HashSet<_>>();
        validation.set_issuer(&[issuer]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway_seconds: 0,
            clock: Arc::new(SystemClock),
        }
    }

    /// Tolerate `seconds` of clock skew past `exp`.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Decode and validate a token.
    ///
    /// # Errors
    /// * `Malformed` - Not a structurally valid token, wrong issuer, or missing claims
    /// * `BadSignature` - Signature mismatch or a declared algorithm other than HS256
    /// * `Expired` - `exp` is not strictly after now
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::MissingAlgorithm => JwtError::BadSignature,
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    _ => JwtError::Malformed(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        let now = self.clock.now().timestamp();
        if claims.is_expired(now, self.leeway_seconds) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;
    use chrono::Utc;
    use jsonwebtoken::encode;
    use jsonwebtoken::Algorithm;
    use jsonwebtoken::EncodingKey;
    use jsonwebtoken::Header;

    use super::*;
    use crate::clock::FixedClock;
    use crate::jwt::issuer::TokenIssuer;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";
    const ISSUER: &str = "test-issuer";

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap())
    }

    fn pair(clock: &FixedClock) -> (TokenIssuer, TokenVerifier) {
        (
            TokenIssuer::new(SECRET, ISSUER).with_clock(Arc::new(clock.clone())),
            TokenVerifier::new(SECRET, ISSUER).with_clock(Arc::new(clock.clone())),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let clock = clock();
        let (issuer, verifier) = pair(&clock);

        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(24))
            .expect("Failed to issue token");
        let claims = verifier.verify(&token).expect("Failed to verify token");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, clock.now().timestamp());
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let clock = clock();
        let (issuer, verifier) = pair(&clock);
        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(24))
            .expect("Failed to issue token");

        clock.advance(Duration::hours(24) - Duration::seconds(1));
        assert!(verifier.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(verifier.verify(&token), Err(JwtError::Expired));

        clock.advance(Duration::hours(1));
        assert_eq!(verifier.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_leeway_extends_window() {
        let clock = clock();
        let issuer = TokenIssuer::new(SECRET, ISSUER).with_clock(Arc::new(clock.clone()));
        let verifier = TokenVerifier::new(SECRET, ISSUER)
            .with_clock(Arc::new(clock.clone()))
            .with_leeway(30);
        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::seconds(60))
            .expect("Failed to issue token");

        clock.advance(Duration::seconds(89));
        assert!(verifier.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(verifier.verify(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let clock = clock();
        let issuer = TokenIssuer::new(b"secret1_at_least_32_bytes_long_key!", ISSUER)
            .with_clock(Arc::new(clock.clone()));
        let verifier = TokenVerifier::new(b"secret2_at_least_32_bytes_long_key!", ISSUER)
            .with_clock(Arc::new(clock.clone()));

        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(verifier.verify(&token), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_verify_rejects_other_hmac_algorithm() {
        let clock = clock();
        let (_, verifier) = pair(&clock);
        let claims = Claims::new(
            "user123",
            "alice",
            "alice@example.com",
            ISSUER,
            clock.now(),
            Duration::hours(1),
        );

        // Same secret, different declared algorithm.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert_eq!(verifier.verify(&token), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_verify_rejects_unsigned_token() {
        let clock = clock();
        let (issuer, verifier) = pair(&clock);
        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");
        let payload = token.split('.').nth(1).expect("Token has no payload");

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert!(verifier.verify(&unsigned).is_err());
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let clock = clock();
        let (issuer, verifier) = pair(&clock);
        let alice = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");
        let mallory = issuer
            .issue("user999", "mallory", "mallory@example.com", Duration::hours(1))
            .expect("Failed to issue token");

        let alice_parts: Vec<&str> = alice.split('.').collect();
        let mallory_parts: Vec<&str> = mallory.split('.').collect();
        let forged = format!("{}.{}.{}", alice_parts[0], mallory_parts[1], alice_parts[2]);

        assert_eq!(verifier.verify(&forged), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_verify_rejects_foreign_issuer() {
        let clock = clock();
        let issuer = TokenIssuer::new(SECRET, "someone-else").with_clock(Arc::new(clock.clone()));
        let verifier = TokenVerifier::new(SECRET, ISSUER).with_clock(Arc::new(clock.clone()));

        let token = issuer
            .issue("user123", "alice", "alice@example.com", Duration::hours(1))
            .expect("Failed to issue token");

        assert!(matches!(verifier.verify(&token), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_verify_malformed_token() {
        let verifier = TokenVerifier::new(SECRET, ISSUER);

        assert!(matches!(
            verifier.verify("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(verifier.verify(""), Err(JwtError::Malformed(_))));
    }
}
