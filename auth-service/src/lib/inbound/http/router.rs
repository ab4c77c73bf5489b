use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_user::current_user;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::session::session;
use super::middleware::authenticate;
use super::middleware::authenticate_optional;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::deadline::Deadline;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub store_timeout: Duration,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Per-request bound on store calls, cancelled on shutdown.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.store_timeout).with_cancellation(self.shutdown.child_token())
    }
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/logout", post(logout));

    let protected_routes = Router::new()
        .route("/api/v1/users/me", get(current_user))
        .route("/api/v1/users/:user_id", get(get_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let optional_routes = Router::new()
        .route("/api/v1/auth/session", get(session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_optional,
        ));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(optional_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
