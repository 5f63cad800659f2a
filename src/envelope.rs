//! Uniform JSON response shape used by every backend endpoint.
//!
//! `{ success, data?, message?, errorMessage?, errorCode? }`
//!
//! The server renders it (handlers and `AppError`), the client parses it.

use serde::{Deserialize, Serialize};

/// Machine-readable codes carried in `errorCode`.
///
/// The two token codes are the contract the request client reacts to;
/// everything else is opaque to it.
pub mod error_code {
    pub const TOKEN_MISSING: &str = "TOKEN_MISSING";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const REFRESH_TOKEN_MISSING: &str = "REFRESH_TOKEN_MISSING";
    pub const REFRESH_TOKEN_EXPIRED: &str = "REFRESH_TOKEN_EXPIRED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error_message: None,
            error_code: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn failure(error_message: impl Into<String>, error_code: Option<&str>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error_message: Some(error_message.into()),
            error_code: error_code.map(str::to_string),
        }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.error_code.as_deref() == Some(code)
    }
}

/// Success envelope without a payload (logout, delete).
impl ApiResponse<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error_message: None,
            error_code: None,
        }
    }
}
