//! Bearer-token authentication.
//!
//! The middleware guards every path except a small public allowlist. It is
//! applied over the whole router, so routes added later are covered too.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dock_deploy::public_paths;
use tracing::{debug, warn};

use crate::error::ServerError;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingHeader,
    InvalidFormat,
    InvalidToken,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "Missing Authorization header",
            AuthFailure::InvalidFormat => {
                "Invalid Authorization header format. Expected: Bearer <token>"
            }
            AuthFailure::InvalidToken => "Invalid authentication token",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Token and allowlist for one deployment.
#[derive(Clone)]
pub struct AuthSettings {
    token: String,
    protect_docs: bool,
    public_paths: Vec<&'static str>,
}

impl AuthSettings {
    pub fn new(token: impl Into<String>, protect_docs: bool) -> Self {
        Self {
            token: token.into(),
            protect_docs,
            public_paths: public_paths(protect_docs),
        }
    }

    pub fn protect_docs(&self) -> bool {
        self.protect_docs
    }

    /// Whether `path` is served without a token.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(&path)
    }

    /// Check an `Authorization` header value.
    pub fn check(&self, header: Option<&[u8]>) -> Result<(), AuthFailure> {
        let header = match header {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthFailure::MissingHeader),
        };

        let provided = std::str::from_utf8(header)
            .ok()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthFailure::InvalidFormat)?;

        if constant_time_eq(provided.as_bytes(), self.token.as_bytes()) {
            Ok(())
        } else {
            Err(AuthFailure::InvalidToken)
        }
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token", &"<redacted>")
            .field("protect_docs", &self.protect_docs)
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware enforcing `Authorization: Bearer <token>`.
pub async fn require_bearer(
    State(settings): State<Arc<AuthSettings>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if settings.is_public(path) {
        debug!("Public path {}", path);
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.as_bytes());

    match settings.check(header) {
        Ok(()) => next.run(request).await,
        Err(failure) => {
            warn!("Rejected request to {}: {}", path, failure);
            ServerError::Unauthorized(failure).into_response()
        }
    }
}
