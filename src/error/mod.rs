//! Error types for Pendel.

use thiserror::Error;

/// Primary error type for all Pendel operations.
#[derive(Error, Debug)]
pub enum PendelError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] crate::auth::AuthError),
}

impl PendelError {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error is the expiry signal from a protected endpoint.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> PendelError {
    let message = extract_message(body).unwrap_or_else(|| body.to_string());
    PendelError::api(status, message)
}

fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("statusMessage"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PendelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_to_error_prefers_json_message() {
        let err = status_to_error(404, r#"{"message":"Trip not found."}"#);
        match err {
            PendelError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Trip not found.");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn status_to_error_falls_back_to_raw_body() {
        let err = status_to_error(500, "boom");
        match err {
            PendelError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn only_401_counts_as_expired() {
        assert!(PendelError::api(401, "").is_auth_expired());
        assert!(!PendelError::api(403, "").is_auth_expired());
        assert!(!PendelError::Configuration("x".into()).is_auth_expired());
    }
}
