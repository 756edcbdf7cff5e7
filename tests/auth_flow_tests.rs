// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-up / sign-in exchange tests.
//!
//! ID tokens are minted with the fixture RSA key and checked by the
//! static-key verifier, so these run offline.

use axum::http::StatusCode;
use bmi_tracker::config::Config;
use bmi_tracker::middleware::auth::verify_session_token;
use tower::ServiceExt;

mod common;
use common::{create_test_app, json_body, post_json, IdTokenClaims};

#[tokio::test]
async fn test_signup_creates_user_and_returns_session() {
    let app = create_test_app();
    let id_token = IdTokenClaims::new("google-sub-1", "ada@gmail.com").sign();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": id_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["user"]["email"], "ada@gmail.com");
    assert_eq!(body["user"]["name"], "Test User");
    // The Google subject never leaves the server
    assert!(body["user"].get("google_id").is_none());
    assert!(body["user"].get("googleId").is_none());

    let claims = verify_session_token(
        body["token"].as_str().unwrap(),
        &app.state.config.jwt_secret,
    )
    .unwrap();
    assert_eq!(claims.email, "ada@gmail.com");
    assert_eq!(claims.google_id, "google-sub-1");
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);

    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn test_signup_twice_updates_instead_of_duplicating() {
    let app = create_test_app();

    let first = IdTokenClaims::new("google-sub-1", "ada@gmail.com").sign();
    let response = app
        .router
        .clone()
        .oneshot(post_json("/auth/google/signup", serde_json::json!({ "token": first })))
        .await
        .unwrap();
    let user_id = json_body(response).await["user"]["id"].as_u64().unwrap();

    let mut claims = IdTokenClaims::new("google-sub-1", "ada@gmail.com");
    claims.name = Some("Ada Lovelace".to_string());
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": claims.sign() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"].as_u64(), Some(user_id));
    assert_eq!(body["user"]["name"], "Ada Lovelace");

    assert_eq!(app.store.user_count().await, 1);
    let stored = app.store.get_user(user_id).await.unwrap();
    assert_eq!(stored.name.as_deref(), Some("Ada Lovelace"));
}

#[tokio::test]
async fn test_email_match_links_new_google_subject() {
    let app = create_test_app();

    let first = IdTokenClaims::new("old-sub", "ada@gmail.com").sign();
    app.router
        .clone()
        .oneshot(post_json("/auth/google/signup", serde_json::json!({ "token": first })))
        .await
        .unwrap();

    let second = IdTokenClaims::new("new-sub", "ada@gmail.com").sign();
    let response = app
        .router
        .clone()
        .oneshot(post_json("/auth/google/verify", serde_json::json!({ "token": second })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let user = app
        .store
        .get_user(body["user"]["id"].as_u64().unwrap())
        .await
        .unwrap();
    assert_eq!(user.google_id, "new-sub");
    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn test_non_gmail_signup_rejected_without_creating_user() {
    let app = create_test_app();
    let id_token = IdTokenClaims::new("google-sub-2", "ada@example.com").sign();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": id_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Only Gmail addresses are allowed for signup");
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_unverified_email_rejected_without_creating_user() {
    let app = create_test_app();
    let mut claims = IdTokenClaims::new("google-sub-3", "ada@gmail.com");
    claims.email_verified = false;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": claims.sign() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Google account is not verified");
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_sign_in_requires_existing_account() {
    let app = create_test_app();
    let id_token = IdTokenClaims::new("google-sub-4", "new@gmail.com").sign();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/verify",
            serde_json::json!({ "token": id_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Account not registered. Please sign up first.");
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_missing_token_and_code() {
    let app = create_test_app();

    for (uri, body, message) in [
        ("/auth/google/verify", serde_json::json!({}), "Token required"),
        ("/auth/google/signup", serde_json::json!({ "token": "" }), "Token required"),
        (
            "/auth/google/callback",
            serde_json::json!({}),
            "Authorization code required",
        ),
    ] {
        let response = app.router.clone().oneshot(post_json(uri, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json_body(response).await["error"], message, "{uri}");
    }
}

#[tokio::test]
async fn test_forged_and_expired_tokens_rejected() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": "not.a.jwt" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Token verification failed");

    let mut claims = IdTokenClaims::new("google-sub-5", "ada@gmail.com");
    claims.iat -= 7200;
    claims.exp = claims.iat + 3600;
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": claims.sign() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Token has expired. Please try signing in again."
    );

    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_wrong_audience_rejected() {
    let app = create_test_app();
    let mut claims = IdTokenClaims::new("google-sub-6", "ada@gmail.com");
    claims.aud = "someone-else.apps.googleusercontent.com".to_string();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": claims.sign() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn test_missing_client_id_is_server_error() {
    let mut config = Config::test_default();
    config.google_client_id = String::new();
    let app = common::create_test_app_with_config(config);

    let id_token = IdTokenClaims::new("google-sub-7", "ada@gmail.com").sign();
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": id_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Server configuration error");
}

#[tokio::test]
async fn test_auth_url_points_at_google() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/auth/google")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let url = body["authUrl"].as_str().unwrap();
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("client_id=test-client-id.apps.googleusercontent.com"));
    assert!(url.contains("access_type=offline"));
}

#[tokio::test]
async fn test_signup_same_subject_new_email_updates_profile() {
    let app = create_test_app();
    let (_, user_id) = common::sign_up(&app, "google-sub-1", "a@gmail.com").await;

    let mut claims = IdTokenClaims::new("google-sub-1", "b@gmail.com");
    claims.name = Some("Renamed User".to_string());
    claims.picture = Some("https://example.com/new.png".to_string());
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": claims.sign() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"].as_u64(), Some(user_id));
    assert_eq!(app.store.user_count().await, 1);

    let stored = app.store.get_user(user_id).await.unwrap();
    assert_eq!(stored.name.as_deref(), Some("Renamed User"));
    assert_eq!(stored.picture.as_deref(), Some("https://example.com/new.png"));
    // Email is the account key and is not rewritten
    assert_eq!(stored.email, "a@gmail.com");
}

#[tokio::test]
async fn test_malformed_auth_body_is_sanitized() {
    let app = create_test_app();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/auth/google/signup")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(r#"{"token": 42"#))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid request body");
    assert_eq!(app.store.user_count().await, 0);
}
