use std::env;
use std::time::Duration;

use auth::PasswordCost;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::Map;
use serde::Deserialize;

/// Minimum HS256 secret length in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub refresh_token: RefreshTokenConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_token_ttl_hours")]
    pub access_token_ttl_hours: i64,
    #[serde(default)]
    pub leeway_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshTokenConfig {
    pub ttl_days: i64,
    pub rotation: bool,
    pub retention_hours: i64,
    pub cleanup_interval_seconds: u64,
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            ttl_days: 30,
            rotation: true,
            retention_hours: 168,
            cleanup_interval_seconds: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = PasswordCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
        }
    }
}

impl From<&PasswordConfig> for PasswordCost {
    fn from(config: &PasswordConfig) -> Self {
        PasswordCost {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_issuer() -> String {
    "aicd-auth-service".to_string()
}

fn default_access_token_ttl_hours() -> i64 {
    auth::authenticator::DEFAULT_ACCESS_TOKEN_TTL_HOURS
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_seconds() -> u64 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::load_from(&run_mode, None)
    }

    /// Load with `environment` standing in for the process environment when
    /// given.
    pub fn load_from(
        run_mode: &str,
        environment: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true)
                    .source(environment),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }
        if self.jwt.access_token_ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "jwt.access_token_ttl_hours must be positive".to_string(),
            ));
        }
        if self.refresh_token.ttl_days <= 0 {
            return Err(ConfigError::Message(
                "refresh_token.ttl_days must be positive".to_string(),
            ));
        }
        if self.refresh_token.retention_hours < 0 {
            return Err(ConfigError::Message(
                "refresh_token.retention_hours must not be negative".to_string(),
            ));
        }
        if self.refresh_token.cleanup_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "refresh_token.cleanup_interval_seconds must be positive".to_string(),
            ));
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "store.timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
