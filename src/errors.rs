//! HTTP-facing error type.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl renders the
//! JSON body `{"error": "..."}` with the mapped status code.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::error::TokenError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Uniform answer for every token failure; the cause is only logged.
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            tracing::error!("Internal error: {:#}", e);
        }
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound | StoreError::DeviceNotFound => {
                ApiError::NotFound(err.to_string())
            }
            StoreError::UsernameExists | StoreError::DeviceExists => {
                ApiError::Conflict(err.to_string())
            }
            StoreError::InvalidUsername | StoreError::InvalidDevice(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StoreError::Backend(e) => ApiError::Internal(e),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Config(_) | TokenError::Encoding(_) => {
                ApiError::Internal(anyhow::Error::new(err))
            }
            TokenError::Malformed
            | TokenError::Signature
            | TokenError::Decode(_)
            | TokenError::Expired => ApiError::Unauthorized,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::BadRequest("invalid id".to_string())
    }
}
