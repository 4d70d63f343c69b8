//! # Authentication Middleware
//!
//! Turns the `Authorization` header into the [`Actor`] every registration
//! operation is checked against.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{agent_id}:{secret}
//! ```
//!
//! `role` is `user` or `admin`. A `user` must name its profile agent; an
//! `admin` may leave `agent_id` empty.
//!
//! ## Outcomes
//!
//! | Auth        | Header              | Actor                         |
//! |-------------|---------------------|-------------------------------|
//! | enabled     | absent              | guest                         |
//! | enabled     | valid bearer        | parsed actor                  |
//! | enabled     | anything else       | 401                           |
//! | disabled    | absent              | admin without a profile agent |
//! | disabled    | bearer              | parsed actor, secret ignored  |

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use mapas_core::{Actor, AgentId};

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The actor behind the current request, injected by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub Actor);

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse `{role}:{agent_id}:{secret}` into an actor.
///
/// With `expected_secret` set the secret must match it; with `None`
/// (auth disabled) the secret is not checked.
pub fn parse_bearer_token(provided: &str, expected_secret: Option<&str>) -> Result<Actor, String> {
    let mut parts = provided.splitn(3, ':');
    let (Some(role), Some(agent), Some(secret)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err("invalid token format, expected {role}:{agent_id}:{secret}".into());
    };

    if let Some(expected) = expected_secret {
        if !constant_time_token_eq(secret, expected) {
            return Err("invalid bearer token".into());
        }
    }

    let profile = if agent.is_empty() {
        None
    } else {
        Some(AgentId(
            agent
                .parse::<u64>()
                .map_err(|e| format!("invalid agent_id: {e}"))?,
        ))
    };

    match (role, profile) {
        ("admin", profile) => Ok(Actor::admin(profile)),
        ("user", Some(profile)) => Ok(Actor::user(profile)),
        ("user", None) => Err("user tokens must name an agent_id".into()),
        (other, _) => Err(format!("unknown role: {other}")),
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Resolve the caller and inject a [`CallerIdentity`] into the request.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.token.clone());

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let actor = match auth_header {
        None if expected.is_some() => Actor::guest(),
        // Auth disabled: full access for local development.
        None => Actor::admin(None),
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, expected.as_deref()) {
                Ok(actor) => actor,
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    return unauthorized_response(&msg);
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                return unauthorized_response("authorization header must use Bearer scheme");
            }
        },
    };

    tracing::debug!(actor = %actor, "caller resolved");
    request.extensions_mut().insert(CallerIdentity(actor));
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
