pub mod memory;
pub mod refresh_token;
pub mod user;

pub use memory::InMemoryCredentialStore;
pub use memory::InMemoryRefreshTokenStore;
pub use refresh_token::PostgresRefreshTokenStore;
pub use user::PostgresCredentialStore;
