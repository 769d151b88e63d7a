//! Error types shared across the service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a request.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error (malformed or missing body field)
    #[error("{0}")]
    Validation(String),

    /// Authentication error
    #[error("{0}")]
    Auth(String),

    /// Not found (id absent or owned by another user)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (duplicate unique field)
    #[error("{0}")]
    Conflict(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generative model call failure
    #[error("Model error: {0}")]
    Upstream(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::Conflict(_) => 400,
            Error::Auth(_) => 401,
            Error::NotFound(_) => 404,
            Error::Upstream(_) => 502,
            _ => 500,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// True when the database rejected a write for violating a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_taxonomy() {
        assert_eq!(Error::Validation("bad".into()).status_code(), 400);
        assert_eq!(Error::Conflict("dup".into()).status_code(), 400);
        assert_eq!(Error::Auth("nope".into()).status_code(), 401);
        assert_eq!(Error::NotFound("gone".into()).status_code(), 404);
        assert_eq!(Error::Upstream("down".into()).status_code(), 502);
        assert_eq!(Error::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn client_facing_errors_display_bare_detail() {
        assert_eq!(Error::NotFound("Task not found.".into()).to_string(), "Task not found.");
        assert_eq!(
            Error::Conflict("Email already registered.".into()).to_string(),
            "Email already registered."
        );
    }
}
