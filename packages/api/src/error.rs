//! Error type shared by every remote call in this crate.

use serde::Deserialize;
use store::StoreError;
use thiserror::Error;

const CONNECTION_MESSAGE: &str =
    "Unable to connect to server. Please check your internet connection and try again.";

/// Failure of a catalog, identity, storage or profile-store call.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("server error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("not found")]
    NotFound,
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse error classes the UI distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Http,
    Authorization,
    Validation,
}

impl ApiError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) | ApiError::Timeout | ApiError::Store(_) => ErrorKind::Connection,
            ApiError::Http { .. } | ApiError::NotFound | ApiError::Decode(_) => ErrorKind::Http,
            ApiError::Unauthorized(_) | ApiError::Auth(_) => ErrorKind::Authorization,
            ApiError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Timeout => CONNECTION_MESSAGE.to_string(),
            ApiError::Http { status, message } => {
                if message.trim().is_empty() {
                    format!("Server error: {}", status)
                } else {
                    message.clone()
                }
            }
            ApiError::Unauthorized(message) if !message.is_empty() => message.clone(),
            ApiError::Unauthorized(_) => {
                "You are not authorized to perform this action.".to_string()
            }
            ApiError::NotFound => "The requested resource was not found.".to_string(),
            ApiError::Decode(_) => "Unexpected response from server.".to_string(),
            ApiError::Auth(message) | ApiError::Validation(message) => message.clone(),
            ApiError::Store(_) => "Could not reach the profile store. Please try again.".to_string(),
        }
    }

    /// Map a non-success status and its body to an error.
    ///
    /// A JSON body with a `message` field supplies the text; otherwise a generic one is used.
    pub fn from_status(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_default();

        match status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound,
            _ => ApiError::Http { status, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: String::new(),
            }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_uses_server_message() {
        let err = ApiError::from_status(400, r#"{"message":"Price too high"}"#);
        assert_eq!(
            err,
            ApiError::Http {
                status: 400,
                message: "Price too high".to_string()
            }
        );
        assert_eq!(err.user_message(), "Price too high");
        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[test]
    fn test_status_mapping_without_body() {
        assert_eq!(ApiError::from_status(404, ""), ApiError::NotFound);
        assert_eq!(
            ApiError::from_status(500, "<html>").user_message(),
            "Server error: 500"
        );
        let unauthorized = ApiError::from_status(403, "not json");
        assert_eq!(unauthorized.kind(), ErrorKind::Authorization);
        assert_eq!(
            unauthorized.user_message(),
            "You are not authorized to perform this action."
        );
    }

    #[test]
    fn test_only_connection_errors_are_transient() {
        assert!(ApiError::Network("reset".into()).is_transient());
        assert!(ApiError::Timeout.is_transient());
        assert!(!ApiError::NotFound.is_transient());
        assert!(!ApiError::Unauthorized(String::new()).is_transient());
        assert!(!ApiError::Decode("eof".into()).is_transient());
    }
}
