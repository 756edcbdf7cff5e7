// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::google_oidc::IdentityError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity verification failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("Account not registered")]
    NotRegistered,

    /// Database failure. The first field is the client-facing message,
    /// the second the underlying detail (logged only).
    #[error("Storage error: {0}: {1}")]
    Storage(&'static str, String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const NOT_REGISTERED_MESSAGE: &'static str =
        "Account not registered. Please sign up first.";

    /// Wrap a storage-layer error, keeping a sanitized message for the client.
    pub fn storage(message: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Storage(message, err.to_string())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotRegistered => StatusCode::BAD_REQUEST,
            AppError::MissingToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::Identity(IdentityError::Transient(_)) => StatusCode::BAD_GATEWAY,
            AppError::Identity(IdentityError::NotConfigured) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Identity(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(..) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::MissingToken => "Access token required".to_string(),
            AppError::InvalidToken => "Invalid or expired token".to_string(),
            AppError::Identity(err) => err.client_message().to_string(),
            AppError::NotRegistered => Self::NOT_REGISTERED_MESSAGE.to_string(),
            AppError::Storage(msg, _) => (*msg).to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Storage(msg, detail) => {
                tracing::error!(error = %detail, "{}", msg);
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Internal server error");
            }
            AppError::Identity(err) => {
                tracing::warn!(error = %err, "Google identity verification failed");
            }
            _ => {}
        }

        let body = ErrorResponse {
            error: self.client_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
