//! Error type system for the canteen backend
//!
//! This module provides:
//! - One error enum covering every failure a request or startup can hit
//! - HTTP status code mapping
//! - JSON error responses carrying a trace ID
//! - Redaction of internal details for 5xx responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Main error type for the canteen backend
#[derive(Debug, thiserror::Error)]
pub enum CanteenError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    // API-related errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    // Credential errors
    #[error("Password hashing failed: {0}")]
    PasswordHashError(String),

    #[error("Token signing failed: {0}")]
    TokenError(String),

    #[error("Task error: {0}")]
    TaskError(String),
}

impl CanteenError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CanteenError::InvalidRequest(_) | CanteenError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }

            CanteenError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            CanteenError::NotFound(_) => StatusCode::NOT_FOUND,

            CanteenError::AlreadyExists(_) => StatusCode::CONFLICT,

            CanteenError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,

            CanteenError::InitializationError(_)
            | CanteenError::DatabaseError(_)
            | CanteenError::PasswordHashError(_)
            | CanteenError::TokenError(_)
            | CanteenError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            CanteenError::InitializationError(_) => "InitializationError",
            CanteenError::DatabaseError(_) => "DatabaseError",
            CanteenError::InvalidRequest(_) => "InvalidRequest",
            CanteenError::ValidationError(_) => "ValidationError",
            CanteenError::AuthenticationError(_) => "AuthenticationError",
            CanteenError::NotFound(_) => "NotFound",
            CanteenError::AlreadyExists(_) => "AlreadyExists",
            CanteenError::NotImplemented(_) => "NotImplemented",
            CanteenError::PasswordHashError(_) => "PasswordHashError",
            CanteenError::TokenError(_) => "TokenError",
            CanteenError::TaskError(_) => "TaskError",
        }
    }

    /// Whether the message can be shown to the client as is.
    ///
    /// Server-side failures keep their detail in the logs only.
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error() && !matches!(self, CanteenError::NotImplemented(_))
    }

    /// Message returned to the client
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    /// True when the error is a SQLite UNIQUE/PRIMARY KEY constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            CanteenError::DatabaseError(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            }
            _ => false,
        }
    }

    /// True when the error is a SQLite FOREIGN KEY constraint violation
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            CanteenError::DatabaseError(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        )
    }
}

tokio::task_local! {
    /// Trace id of the request currently being served
    pub static REQUEST_TRACE_ID: String;
}

/// Trace id of the current request, or a fresh one outside a request
pub fn current_trace_id() -> String {
    REQUEST_TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response tagged with the current trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: current_trace_id(),
        }
    }

    /// Create an error response from a CanteenError
    pub fn from_error(error: &CanteenError) -> Self {
        Self::new(error.error_type().to_string(), error.public_message())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (trace_id: {})", self.error, self.message, self.trace_id)
    }
}

impl IntoResponse for CanteenError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if self.is_internal() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::debug!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with CanteenError
pub type Result<T> = std::result::Result<T, CanteenError>;

/// Context extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CanteenError::InitializationError(format!("{}: {}", context.into(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            CanteenError::InvalidRequest("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CanteenError::AuthenticationError("test".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            CanteenError::AlreadyExists("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CanteenError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CanteenError::NotImplemented("test".into()).status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            CanteenError::DatabaseError(rusqlite::Error::InvalidQuery).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_redacted() {
        let error = CanteenError::DatabaseError(rusqlite::Error::InvalidQuery);
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.error, "DatabaseError");
        assert_eq!(response.message, "Internal server error");
        assert!(!response.trace_id.is_empty());

        let error = CanteenError::PasswordHashError("bcrypt cost out of range".into());
        assert!(!ErrorResponse::from_error(&error).message.contains("bcrypt"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let error = CanteenError::AlreadyExists("User already exists, please login".into());
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.error, "AlreadyExists");
        assert!(response.message.contains("please login"));
    }

    #[test]
    fn test_unique_violation_detection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();

        assert!(CanteenError::DatabaseError(err).is_unique_violation());
        assert!(!CanteenError::DatabaseError(rusqlite::Error::InvalidQuery).is_unique_violation());
    }

    #[tokio::test]
    async fn test_error_response_uses_request_trace_id() {
        let response = REQUEST_TRACE_ID
            .scope("trace-123".to_string(), async {
                ErrorResponse::from_error(&CanteenError::NotFound("menu".into()))
            })
            .await;
        assert_eq!(response.trace_id, "trace-123");

        let outside = ErrorResponse::from_error(&CanteenError::NotFound("menu".into()));
        assert!(Uuid::parse_str(&outside.trace_id).is_ok());
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));

        let err = result.context("Failed to open database").unwrap_err();
        assert!(err.to_string().contains("Failed to open database"));
        assert!(err.to_string().contains("file not found"));
    }
}
