//! Centralized API error handling
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Access denied")]
    TokenMissing,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Error body for endpoints that report failures as `{ message }`
#[derive(Serialize)]
pub struct MessageErrorResponse {
    pub message: String,
    pub code: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::UserExists => "USER_EXISTS",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::InvalidSignature => "INVALID_SIGNATURE",
            ApiError::TokenMissing => "TOKEN_MISSING",
            ApiError::TokenInvalid => "TOKEN_INVALID",
            ApiError::TooManyRequests => "TOO_MANY_REQUESTS",
            ApiError::StorageError(_) => "STORAGE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::ValidationError(_)
            | ApiError::UserNotFound
            | ApiError::UserExists
            | ApiError::InvalidCredentials
            | ApiError::InvalidSignature => StatusCode::BAD_REQUEST,
            ApiError::TokenMissing => StatusCode::UNAUTHORIZED,
            ApiError::TokenInvalid => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::StorageError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the client; server-side details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            ApiError::StorageError(_) | ApiError::InternalError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    fn log(&self) {
        let code = self.error_code();
        match self {
            ApiError::StorageError(_) | ApiError::InternalError(_) => {
                tracing::error!(error = %self, code = %code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %self, code = %code, "Client error occurred");
            }
        }
    }

    /// Render as `{ message, code }` instead of `{ error, code }`
    pub fn into_message_response(self) -> Response {
        self.log();
        let body = MessageErrorResponse {
            message: self.public_message(),
            code: self.error_code().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorResponse {
            error: self.public_message(),
            code: self.error_code().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Wrapper for handlers whose errors use the `{ message }` shape
#[derive(Debug)]
pub struct MessageError(pub ApiError);

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        self.0.into_message_response()
    }
}

impl From<ApiError> for MessageError {
    fn from(err: ApiError) -> Self {
        MessageError(err)
    }
}

impl From<AuthError> for MessageError {
    fn from(err: AuthError) -> Self {
        MessageError(err.into())
    }
}

impl From<validator::ValidationErrors> for MessageError {
    fn from(err: validator::ValidationErrors) -> Self {
        MessageError(err.into())
    }
}

/// JSON body extractor whose rejections render as [`ApiError::BadRequest`]
/// instead of axum's plain-text responses.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// Convenience conversions from common error types

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Storage(e) => ApiError::StorageError(e.to_string()),
            AuthError::UserNotFound => ApiError::UserNotFound,
            AuthError::UserExists => ApiError::UserExists,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidSignature(_) => ApiError::InvalidSignature,
            AuthError::InvalidWalletAddress(addr) => {
                ApiError::BadRequest(format!("Invalid wallet address: {}", addr))
            }
            AuthError::Token(_) => ApiError::TokenInvalid,
            AuthError::Internal(e) => ApiError::InternalError(e),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}
