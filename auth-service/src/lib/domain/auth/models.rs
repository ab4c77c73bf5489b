use auth::RefreshSecret;

use crate::domain::user::models::Password;
use crate::domain::user::models::User;

/// Token type reported alongside every access token.
pub const TOKEN_TYPE: &str = "Bearer";

/// Command to log in with email and password
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: Password,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self {
            email,
            password: Password::presented(password),
        }
    }
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshSecret,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Successful refresh.
///
/// `refresh_token` is present only when rotation replaced the presented
/// token.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub refresh_token: Option<RefreshSecret>,
    pub token_type: &'static str,
    pub expires_in: i64,
}
