// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::{DatabaseError, ErrorKind};
use crate::record::RecordError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, detail: Option<String> },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict { message: String, detail: Option<String> },

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error; detail is only shown when configured
    InternalServerError { message: String, detail: Option<String> },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict { message, .. } => message,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    fn detail(&self, expose_internal: bool) -> Option<&str> {
        match self {
            ApiError::BadRequest { detail, .. } | ApiError::Conflict { detail, .. } => detail.as_deref(),
            ApiError::InternalServerError { detail, .. } if expose_internal => detail.as_deref(),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self, expose_internal: bool) -> Value {
        let mut body = json!({
            "status": "error",
            "message": self.message(),
        });
        if let Some(detail) = self.detail(expose_internal) {
            body["data"] = Value::String(detail.to_string());
        }
        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), detail: None }
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: "Invalid input".to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: "Record already exists".to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err.kind() {
            ErrorKind::InvalidInput => ApiError::invalid_input(err.to_string()),
            ErrorKind::NotFound => ApiError::not_found(err.to_string()),
            ErrorKind::Conflict => ApiError::conflict(err.to_string()),
            ErrorKind::StorageFailure => match err {
                DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
                | DatabaseError::Sqlx(sqlx::Error::PoolClosed)
                | DatabaseError::Sqlx(sqlx::Error::Io(_)) => {
                    tracing::error!("Database unavailable: {}", err);
                    ApiError::service_unavailable("Database temporarily unavailable")
                }
                other => {
                    // Log the real error but return generic message
                    tracing::error!("Storage failure: {}", other);
                    ApiError::internal_server_error("Database error occurred", other.to_string())
                }
            },
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Hash(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                ApiError::internal_server_error("Failed to process password", msg)
            }
            other => ApiError::invalid_input(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::InvalidToken(_) | AuthError::WrongTokenType => {
                ApiError::unauthorized("Invalid or expired token")
            }
            AuthError::MissingSecret | AuthError::TokenGeneration(_) | AuthError::Hash(_) => {
                tracing::error!("Authentication failure: {}", err);
                ApiError::internal_server_error("Authentication is unavailable", err.to_string())
            }
        }
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
        let expose = crate::config::config().api.expose_error_detail;
        (self.status_code(), Json(self.to_json(expose))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_kinds_map_to_status_codes() {
        let cases = [
            (DatabaseError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (DatabaseError::NotFound("Victim 9 not found".into()), StatusCode::NOT_FOUND),
            (DatabaseError::Conflict("duplicate key".into()), StatusCode::CONFLICT),
            (DatabaseError::Sqlx(sqlx::Error::PoolTimedOut), StatusCode::SERVICE_UNAVAILABLE),
            (DatabaseError::Sqlx(sqlx::Error::ColumnNotFound("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn envelope_carries_client_detail() {
        let err = ApiError::from(RecordError::EmptyUpdate);
        let body = err.to_json(false);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid input");
        assert!(body["data"].as_str().unwrap().contains("empty update"));
    }

    #[test]
    fn internal_detail_is_hidden_unless_exposed() {
        let err = ApiError::internal_server_error("Database error occurred", "relation \"x\" does not exist");
        assert!(err.to_json(false).get("data").is_none());
        assert_eq!(err.to_json(true)["data"], "relation \"x\" does not exist");
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::WrongTokenType).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::MissingSecret).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
