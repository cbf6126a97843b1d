use serde_json::Value;
use thiserror::Error;

use super::TransportError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The backend answered with a non-2xx status. `message` is the
    /// backend-supplied text when there is one.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Maximum length for non-JSON error bodies kept on an error
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Human-readable description, suitable for showing to a user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Truncate a response body to avoid holding on to huge error pages
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX_ERROR_BODY_LENGTH)
            .last()
            .unwrap_or(0);
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_error_displays_message() {
        let err = ApiError::Status {
            status: 404,
            message: "Route not found".to_string(),
            body: json!({"message": "Route not found"}),
        };
        assert_eq!(err.message(), "Route not found");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = ApiError::from(TransportError::new("connection refused"));
        assert_eq!(err.message(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(ApiError::truncate_body("short"), "short");

        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
