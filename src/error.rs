//! Error types for the UltraDNS client

use reqwest::StatusCode;
use thiserror::Error;

/// Everything the client core can fail with.
#[derive(Debug, Error)]
pub enum UdnsError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("authentication failed with status {status}: {body}")]
    AuthenticationFailed { status: StatusCode, body: String },

    #[error("the access token expired and there is no refresh token to renew it")]
    RefreshUnavailable,

    #[error("request failed with status {status}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("202 Accepted response carried no X-Task-Id header")]
    MissingTaskId,

    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to format JSON: {0}")]
    Format(String),
}

impl UdnsError {
    /// HTTP status attached to the error, if the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UdnsError::AuthenticationFailed { status, .. }
            | UdnsError::RequestFailed { status, .. } => Some(*status),
            UdnsError::Http(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, UdnsError>;
