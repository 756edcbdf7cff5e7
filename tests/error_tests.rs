// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use bmi_tracker::error::AppError;
use bmi_tracker::services::IdentityError;

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Validation("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::MissingToken, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::FORBIDDEN),
        (AppError::NotRegistered, StatusCode::BAD_REQUEST),
        (
            AppError::Identity(IdentityError::EmailDomain),
            StatusCode::BAD_REQUEST,
        ),
        (
            AppError::Identity(IdentityError::Transient("jwks timeout".to_string())),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::Identity(IdentityError::NotConfigured),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::storage("Failed to save BMI record", "deadlock"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.status(), status, "{err}");
    }
}

#[test]
fn test_client_messages_hide_detail() {
    let err = AppError::storage("Failed to fetch history", "Access denied for user 'root'");
    assert_eq!(err.client_message(), "Failed to fetch history");

    let err = AppError::Identity(IdentityError::Verification(
        "InvalidSignature at byte 12".to_string(),
    ));
    assert_eq!(err.client_message(), "Token verification failed");

    let err = AppError::Internal(anyhow::anyhow!("secret stack trace"));
    assert_eq!(err.client_message(), "Internal server error");
}

#[tokio::test]
async fn test_error_body_shape() {
    let response = AppError::MissingToken.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Access token required" }));
}
