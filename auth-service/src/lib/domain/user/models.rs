use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::AvatarUrlError;
use crate::user::errors::EmailError;
use crate::user::errors::FullNameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;
use crate::user::errors::ValidationErrors;

/// Credential record of a registered user.
///
/// `password_hash` is the PHC string produced by the password hasher; the
/// plaintext never reaches this type. Records are never deleted here,
/// deactivation flips `is_active`.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub full_name: Option<FullName>,
    pub avatar_url: Option<AvatarUrl>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-50 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 50 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(username))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Optional display name, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    const MAX_LENGTH: usize = 100;

    pub fn new(full_name: String) -> Result<Self, FullNameError> {
        let length = full_name.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(FullNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(full_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional profile picture location, at most 500 characters. Stored as
/// given; the service never fetches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrl(String);

impl AvatarUrl {
    const MAX_LENGTH: usize = 500;

    pub fn new(avatar_url: String) -> Result<Self, AvatarUrlError> {
        let length = avatar_url.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(AvatarUrlError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(avatar_url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password in transit between request and hasher.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// Accept a new password subject to the registration policy.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    /// Wrap a password presented at login. No policy applies: a stored
    /// account may predate the current rules.
    pub fn presented(password: String) -> Self {
        Self(password)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    pub full_name: Option<FullName>,
    pub avatar_url: Option<AvatarUrl>,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `username` - Validated username
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by service)
    /// * `full_name` - Optional validated display name
    /// * `avatar_url` - Optional validated avatar location
    pub fn new(
        username: Username,
        email: EmailAddress,
        password: Password,
        full_name: Option<FullName>,
        avatar_url: Option<AvatarUrl>,
    ) -> Self {
        Self {
            username,
            email,
            password,
            full_name,
            avatar_url,
        }
    }

    /// Validate raw input, reporting every violated field at once.
    ///
    /// # Errors
    /// * `ValidationErrors` - One entry per invalid field
    pub fn parse(
        username: String,
        email: String,
        password: String,
        full_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = Username::new(username)
            .map_err(|e| errors.push("username", e))
            .ok();
        let email = EmailAddress::new(email)
            .map_err(|e| errors.push("email", e))
            .ok();
        let password = Password::new(password)
            .map_err(|e| errors.push("password", e))
            .ok();
        let full_name = match full_name {
            Some(name) => FullName::new(name)
                .map(Some)
                .map_err(|e| errors.push("full_name", e))
                .ok(),
            None => Some(None),
        };
        let avatar_url = match avatar_url {
            Some(url) => AvatarUrl::new(url)
                .map(Some)
                .map_err(|e| errors.push("avatar_url", e))
                .ok(),
            None => Some(None),
        };

        match (username, email, password, full_name, avatar_url) {
            (Some(username), Some(email), Some(password), Some(full_name), Some(avatar_url)) => {
                Ok(Self::new(username, email, password, full_name, avatar_url))
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert!(Username::new("ab".to_string()).is_err());
        assert!(Username::new("abc".to_string()).is_ok());
        assert!(Username::new("a".repeat(50)).is_ok());
        assert_eq!(
            Username::new("a".repeat(51)),
            Err(UsernameError::TooLong { max: 50, actual: 51 })
        );
    }

    #[test]
    fn test_username_counts_characters() {
        assert!(Username::new("éé".to_string()).is_err());
        assert!(Username::new("ééé".to_string()).is_ok());
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("alice@x.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("short".to_string()).is_err());
        assert!(Password::new("longpassword1".to_string()).is_ok());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::presented("longpassword1".to_string());
        assert!(!format!("{:?}", password).contains("longpassword1"));
    }

    #[test]
    fn test_parse_collects_all_violations() {
        let result = RegisterCommand::parse(
            "a".to_string(),
            "nope".to_string(),
            "short".to_string(),
            Some("x".repeat(101)),
            Some("x".repeat(501)),
        );

        let errors = result.unwrap_err();
        let fields: Vec<_> = errors.violations().iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec!["username", "email", "password", "full_name", "avatar_url"]
        );
    }

    #[test]
    fn test_parse_success() {
        let command = RegisterCommand::parse(
            "alice".to_string(),
            "alice@x.com".to_string(),
            "longpassword1".to_string(),
            None,
            Some("https://x.com/alice.png".to_string()),
        )
        .unwrap();

        assert_eq!(command.username.as_str(), "alice");
        assert!(command.full_name.is_none());
        assert_eq!(
            command.avatar_url.as_ref().map(|u| u.as_str()),
            Some("https://x.com/alice.png")
        );
    }

    #[test]
    fn test_avatar_url_bounds() {
        assert!(AvatarUrl::new("x".repeat(500)).is_ok());
        assert_eq!(
            AvatarUrl::new("x".repeat(501)),
            Err(AvatarUrlError::TooLong { max: 500, actual: 501 })
        );
    }
}
