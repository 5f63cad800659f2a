//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single API call.
///
/// Every outcome other than a successful envelope ends up here: transport
/// problems, backend-reported failures and unrecoverable auth failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status, or 500 for transport and decoding failures
    pub status: u16,
    /// Human-readable message, usually the envelope's `errorMessage`
    pub message: String,
    /// Machine error code from the envelope, if any
    pub code: Option<String>,
}

impl ApiError {
    pub const NETWORK_ERROR: &'static str = "Network error or invalid response";

    pub fn new(status: u16, message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }

    /// Network failure, non-JSON body or a payload that does not decode.
    pub fn transport() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            Self::NETWORK_ERROR,
            None,
        )
    }

    pub fn unauthorized(message: impl Into<String>, code: Option<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED.as_u16(), message, code)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Errors raised while building an [`ApiClient`](super::ApiClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The base URL does not parse
    #[error("Invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
