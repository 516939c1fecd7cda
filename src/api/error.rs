//! HTTP error mapping
//!
//! Every failure leaves the API as JSON: field errors as a map of message
//! lists, everything else as `{"detail": "..."}`.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::domain::{DomainError, FieldErrors};
use crate::infrastructure::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,
    #[error("{0}")]
    NotAuthenticated(String),
    #[error("Invalid page.")]
    InvalidPage,
    /// The request could not be read (bad JSON, multipart or query string)
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Domain(DomainError::Validation(errors))
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::NotAuthenticated(e.to_string())
    }
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(DomainError::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::Domain(DomainError::NotFound) => detail(StatusCode::NOT_FOUND, "Not found."),
            ApiError::Domain(e @ DomainError::ReferenceNotFound(_)) => {
                detail(StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Domain(DomainError::ReferentialConflict(message)) => {
                detail(StatusCode::CONFLICT, message)
            }
            ApiError::Domain(e @ (DomainError::Database(_) | DomainError::Storage(_))) => {
                tracing::error!("Request failed: {}", e);
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.")
            }
            ApiError::PermissionDenied => {
                detail(StatusCode::FORBIDDEN, ApiError::PermissionDenied.to_string())
            }
            ApiError::NotAuthenticated(message) => {
                let mut response = detail(StatusCode::UNAUTHORIZED, message);
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    header::HeaderValue::from_static("Bearer"),
                );
                response
            }
            ApiError::InvalidPage => detail(StatusCode::NOT_FOUND, "Invalid page."),
            ApiError::Rejected { status, message } => detail(status, message),
        }
    }
}
