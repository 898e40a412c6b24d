//! Error types for the HTTP surface.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthFailure;

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the server, most of them as HTTP responses.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    Unauthorized(AuthFailure),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Agent runtime not configured: {0}")]
    RuntimeUnavailable(String),

    #[error("Agent run failed: {0}")]
    Runtime(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::AgentNotFound(_)
            | ServerError::TeamNotFound(_)
            | ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::RuntimeUnavailable(_) => StatusCode::NOT_IMPLEMENTED,
            ServerError::Runtime(_) | ServerError::Bind { .. } | ServerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ServerError::Unauthorized(_) => "Authentication required",
            ServerError::AgentNotFound(_) => "agent_not_found",
            ServerError::TeamNotFound(_) => "team_not_found",
            ServerError::NotFound(_) => "not_found",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::RuntimeUnavailable(_) => "runtime_unavailable",
            ServerError::Runtime(_) => "run_failed",
            ServerError::Bind { .. } | ServerError::Io(_) => "internal_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ServerError::Unauthorized(failure) => json!({
                "error": self.code(),
                "message": failure.message(),
                "hint": "Include 'Authorization: Bearer <your-token>' header",
            }),
            _ => json!({
                "error": self.code(),
                "message": self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
