// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every error renders as the standard envelope
/// `{"success": false, "error": <status>, "message": ...}`; auth errors
/// additionally carry a machine-readable `code`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest,

    // 404 Not Found
    NotFound,

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 422 Unprocessable Entity (catch-all for persistence/processing failures)
    Unprocessable,

    // 401/403 with machine code, raised before the handler body runs
    Auth(AuthError),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest => 400,
            ApiError::NotFound => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::Unprocessable => 422,
            ApiError::Auth(err) => err.status_code(),
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest => "bad request".to_string(),
            ApiError::NotFound => "resource not found".to_string(),
            ApiError::MethodNotAllowed => "method not allowed".to_string(),
            ApiError::Unprocessable => "unprocessable".to_string(),
            ApiError::Auth(err) => err.description(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Auth(err) => json!({
                "success": false,
                "error": err.status_code(),
                "code": err.code(),
                "message": err.description(),
            }),
            _ => json!({
                "success": false,
                "error": self.status_code(),
                "message": self.message(),
            }),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ApiError::NotFound,
            other => {
                // Don't expose internal database errors to clients
                tracing::error!("database error: {}", other);
                ApiError::Unprocessable
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("recipe encoding error: {}", err);
        ApiError::Unprocessable
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
