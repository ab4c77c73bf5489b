use std::fmt;

use rand::distr::Alphanumeric;
use rand::rng;
use rand::Rng;
use sha2::Digest;
use sha2::Sha256;

/// Length of a generated refresh secret (alphanumeric characters).
pub const REFRESH_SECRET_LENGTH: usize = 64;

/// Raw refresh token value handed to the client exactly once.
///
/// Only its digest is meant to be persisted. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshSecret(String);

impl RefreshSecret {
    /// Generate a high-entropy secret from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let secret = rng()
            .sample_iter(&Alphanumeric)
            .take(REFRESH_SECRET_LENGTH)
            .map(char::from)
            .collect();

        Self(secret)
    }

    /// Wrap a secret presented by a client.
    pub fn from_client(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Storage key for this secret.
    pub fn digest(&self) -> String {
        digest_refresh_secret(&self.0)
    }

    /// Raw value, for the response body only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshSecret(***)")
    }
}

/// SHA-256 hash a refresh secret for storage (lowercase hex).
pub fn digest_refresh_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
