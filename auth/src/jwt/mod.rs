pub mod claims;
pub mod errors;
pub mod issuer;
pub mod verifier;

pub use claims::Claims;
pub use errors::JwtError;
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;

/// The only signing algorithm issued or accepted.
pub const PINNED_ALGORITHM: jsonwebtoken::Algorithm = jsonwebtoken::Algorithm::HS256;
