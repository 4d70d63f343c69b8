//! # mapas-api: Registration Service
//!
//! Axum application exposing registrations over JSON. The domain rules live
//! in `mapas-state`; this crate resolves the caller, wires the in-memory
//! port adapters, and maps errors to HTTP.
//!
//! ## API Surface
//!
//! | Prefix                  | Module                      |
//! |-------------------------|-----------------------------|
//! | `/health/*`             | probes, unauthenticated     |
//! | `/v1/registrations/*`   | [`routes::registrations`]   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```

pub mod adapters;
pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the application router.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::registrations::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}
