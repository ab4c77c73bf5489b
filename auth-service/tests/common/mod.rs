#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use auth::Authenticator;
use auth::FixedClock;
use auth::PasswordCost;
use auth_service::domain::auth::service::AuthService;
use auth_service::domain::session::service::RefreshTokenManager;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::outbound::repositories::InMemoryCredentialStore;
use auth_service::outbound::repositories::InMemoryRefreshTokenStore;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ISSUER: &str = "aicd-auth-service";

/// Test application that spawns a real server over in-memory stores
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub clock: FixedClock,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenStore>,
    pub sessions: Arc<RefreshTokenManager<InMemoryRefreshTokenStore>>,
    pub authenticator: Arc<Authenticator>,
    pub shutdown: CancellationToken,
}

impl TestApp {
    /// Spawn the application with refresh token rotation enabled
    pub async fn spawn() -> Self {
        Self::spawn_with_rotation(true).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_rotation(rotation: bool) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());

        // Minimal Argon2 cost keeps the suite fast
        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET, ISSUER)
                .with_password_cost(PasswordCost {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                })
                .expect("Invalid password cost")
                .with_clock(Arc::new(clock.clone())),
        );

        let credentials = Arc::new(InMemoryCredentialStore::new());
        let refresh_tokens = Arc::new(InMemoryRefreshTokenStore::new());
        let sessions = Arc::new(RefreshTokenManager::new(
            Arc::clone(&refresh_tokens),
            Arc::new(clock.clone()),
            Duration::days(30),
            Duration::hours(168),
        ));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&credentials),
            Arc::clone(&sessions),
            Arc::clone(&authenticator),
            rotation,
        ));

        let shutdown = CancellationToken::new();
        let router = create_router(AppState {
            auth_service,
            authenticator: Arc::clone(&authenticator),
            store_timeout: StdDuration::from_secs(5),
            shutdown: shutdown.clone(),
        });

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            clock,
            credentials,
            refresh_tokens,
            sessions,
            authenticator,
            shutdown,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and return the response
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the response
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/auth/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Exchange a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post("/api/v1/auth/refresh")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register alice, log in and return the login `data` object
    pub async fn alice_session(&self) -> Value {
        self.register("alice", "alice@x.com", "longpassword1").await;
        let response = self.login("alice@x.com", "longpassword1").await;
        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
