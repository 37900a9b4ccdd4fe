//! Error types for the session client.

use mk_core::ValidationError;
use thiserror::Error;

/// Session client errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An app key, host, event or segmentation failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Failed to encode request parameters.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    /// Server returned a non-success status.
    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },
    /// Server replied with a body that does not report success.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The facade was used before a session was started.
    #[error("no session started; call MetricsKit::start_with_app_key first")]
    NotStarted,
    /// The facade already holds a session.
    #[error("a session has already been started")]
    AlreadyStarted,
    /// The facade session was ended and accepts no further calls.
    #[error("the session has ended")]
    Ended,
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_message_is_passed_through() {
        let err = SessionError::from(ValidationError::Empty { field: "event key" });
        assert_eq!(err.to_string(), "event key cannot be empty");
    }

    #[test]
    fn server_error_includes_status_and_body() {
        let err = SessionError::Server {
            status: 400,
            body: "Missing parameter \"app_key\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "server error (400): Missing parameter \"app_key\""
        );
    }
}
