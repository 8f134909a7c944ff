//! Error types for Pulsegate bridge operations.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for Pulsegate operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing, malformed, expired, or non-admin bearer credential
    #[error("authentication failed")]
    Unauthenticated,

    /// Request body is not valid JSON or lacks required fields
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The analysis process could not be started at all
    #[error("failed to launch analysis process: {0}")]
    Launch(String),

    /// The analysis process ran and rejected its input (validation exit code)
    #[error("{0}")]
    ValidationFailure(String),

    /// The analysis process exited with an unclassified nonzero code
    #[error("{0}")]
    ProcessCrash(String),

    /// The analysis process exceeded the wall-clock budget and was killed
    #[error("analysis process timed out after {0}s")]
    Timeout(u64),

    /// Invalid gateway configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias for Pulsegate operations
pub type Result<T> = std::result::Result<T, GatewayError>;

impl IntoResponse for GatewayError {
    /// Map the error taxonomy onto HTTP statuses.
    ///
    /// 401 carries no body detail. 400/500 carry an `{ "error": … }` JSON
    /// body whose message has already been sanitized — raw stderr never
    /// reaches this point.
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::Unauthenticated => {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            GatewayError::MalformedRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::ValidationFailure(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::Launch(_) => {
                // The detail may name the interpreter path; keep it on the
                // diagnostic channel and hand the caller a generic message.
                tracing::error!(error = %self, "analysis process launch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to launch analysis process".to_string(),
                )
            }
            GatewayError::ProcessCrash(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            GatewayError::Timeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            GatewayError::InvalidConfig(_) => {
                tracing::error!(error = %self, "configuration error surfaced at request time");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_request_display() {
        let err = GatewayError::MalformedRequest("missing field `scenario`".to_string());
        assert_eq!(err.to_string(), "malformed request: missing field `scenario`");
    }

    #[test]
    fn test_timeout_display() {
        let err = GatewayError::Timeout(30);
        assert_eq!(err.to_string(), "analysis process timed out after 30s");
    }

    #[test]
    fn test_validation_failure_passes_message_through() {
        let err = GatewayError::ValidationFailure("error: bad scenario".to_string());
        assert_eq!(err.to_string(), "error: bad scenario");
    }

    #[test]
    fn test_unauthenticated_response_has_no_body() {
        let response = GatewayError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_validation_failure_maps_to_400() {
        let response =
            GatewayError::ValidationFailure("error: bad scenario".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_crash_maps_to_500() {
        let response = GatewayError::ProcessCrash("ValueError: bad data".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_launch_body_hides_interpreter_path() {
        let err = GatewayError::Launch(
            "failed to spawn '/opt/venv/bin/python': No such file or directory".to_string(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "failed to launch analysis process");
        assert!(!bytes.windows(4).any(|w| w == b"/opt"));
    }
}
