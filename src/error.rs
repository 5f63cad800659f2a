/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse: HTTP status + ApiResponse envelope with errorCode
 * - Uniform conversion of RepoError / ConfigError / model validation errors
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::ConfigError;
use crate::envelope::{ApiResponse, error_code};
use crate::repos::error::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication token missing")]
    TokenMissing,

    #[error("Invalid or expired token")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Refresh token missing")]
    RefreshTokenMissing,

    #[error("Refresh token invalid or expired")]
    RefreshTokenExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("{resource} not found.")]
    NotFound { resource: &'static str },

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TokenMissing
            | AppError::TokenExpired
            | AppError::TokenInvalid
            | AppError::RefreshTokenMissing
            | AppError::RefreshTokenExpired
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => error_code::BAD_REQUEST,
            AppError::TokenMissing => error_code::TOKEN_MISSING,
            AppError::TokenExpired => error_code::TOKEN_EXPIRED,
            AppError::TokenInvalid => error_code::TOKEN_INVALID,
            AppError::RefreshTokenMissing => error_code::REFRESH_TOKEN_MISSING,
            AppError::RefreshTokenExpired => error_code::REFRESH_TOKEN_EXPIRED,
            AppError::InvalidCredentials => error_code::INVALID_CREDENTIALS,
            AppError::Forbidden => error_code::FORBIDDEN,
            AppError::NotFound { .. } => error_code::NOT_FOUND,
            AppError::Internal => error_code::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::<()>::failure(self.to_string(), Some(self.code()));

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
            RepoError::Conflict => AppError::bad_request("A record with the same key already exists"),
            RepoError::ForeignKey => AppError::bad_request("Related record is missing or still in use"),
            RepoError::Check => AppError::bad_request("Value violates a table constraint"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::bad_request(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::bad_request(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::bad_request(e.body_text())
    }
}

impl From<ConfigError> for AppError {
    fn from(_: ConfigError) -> Self {
        AppError::Internal
    }
}
