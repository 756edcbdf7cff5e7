// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use bmi_tracker::config::Config;
use bmi_tracker::db::{MemoryStore, Store};
use bmi_tracker::routes::create_router;
use bmi_tracker::services::{GoogleOAuthClient, GoogleOidcVerifier};
use bmi_tracker::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key id the static verifier accepts.
pub const TEST_KID: &str = "test-google-key";

const PRIVATE_KEY_PEM: &[u8] = include_bytes!("../fixtures/google_test_key.pem");
const PUBLIC_KEY_PEM: &[u8] = include_bytes!("../fixtures/google_test_key.pub.pem");

/// Test app pieces: router, shared state, and the concrete in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
}

/// Create a test app backed by [`MemoryStore`] and a static-key verifier.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let google_oauth = GoogleOAuthClient::new(&config).expect("OAuth client should build");
    build_test_app(config, google_oauth)
}

/// Test app whose code exchange talks to `token_url` instead of Google.
#[allow(dead_code)]
pub fn create_test_app_with_token_url(token_url: &str) -> TestApp {
    let config = Config::test_default();
    let google_oauth = GoogleOAuthClient::new(&config)
        .expect("OAuth client should build")
        .with_token_url(token_url);
    build_test_app(config, google_oauth)
}

#[allow(dead_code)]
fn build_test_app(config: Config, google_oauth: GoogleOAuthClient) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let decoding_key =
        DecodingKey::from_rsa_pem(PUBLIC_KEY_PEM).expect("test public key should parse");
    let google_oidc_verifier = Arc::new(
        GoogleOidcVerifier::new_with_static_key(&config, TEST_KID, decoding_key)
            .expect("static verifier should build"),
    );

    let state = Arc::new(AppState {
        config,
        store: store.clone() as Arc<dyn Store>,
        google_oidc_verifier,
        google_oauth,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
    }
}

/// Claims of a Google-shaped ID token.
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

#[allow(dead_code)]
impl IdTokenClaims {
    /// Valid claims for the test client id.
    pub fn new(sub: &str, email: &str) -> Self {
        let now = now_secs();
        Self {
            iss: "https://accounts.google.com".to_string(),
            aud: Config::test_default().google_client_id,
            sub: sub.to_string(),
            email: email.to_string(),
            email_verified: true,
            name: Some("Test User".to_string()),
            picture: Some("https://example.com/avatar.png".to_string()),
            iat: now,
            exp: now + 3600,
        }
    }

    /// Sign with the fixture RSA key.
    pub fn sign(&self) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(TEST_KID.to_string());
        let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM).expect("test private key should parse");
        encode(&header, self, &key).expect("ID token should encode")
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// JSON POST request.
#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request carrying a bearer token.
#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sign up through the API and return `(session token, user id)`.
#[allow(dead_code)]
pub async fn sign_up(app: &TestApp, sub: &str, email: &str) -> (String, u64) {
    use tower::ServiceExt;

    let id_token = IdTokenClaims::new(sub, email).sign();
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/auth/google/signup",
            serde_json::json!({ "token": id_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body = json_body(response).await;
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_u64().unwrap(),
    )
}
