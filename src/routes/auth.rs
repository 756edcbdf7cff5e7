// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in routes.
//!
//! Three exchanges end in the same place: a verified Google identity is
//! linked to a local user and a session token is issued.
//! - `/auth/google/signup` takes an ID token and may create the account.
//! - `/auth/google/verify` takes an ID token for an existing account.
//! - `/auth/google/callback` takes a redirect-flow code for an existing account.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::routes::JsonBody;
use crate::services::account::{build_auth_response, sync_google_user, AuthResponse, SyncMode};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_url))
        .route("/auth/google/callback", post(auth_callback))
        .route("/auth/google/verify", post(sign_in))
        .route("/auth/google/signup", post(sign_up))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Consent screen URL for the redirect flow.
async fn auth_url(State(state): State<Arc<AppState>>) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        auth_url: state.google_oauth.authorization_url(),
    })
}

#[derive(Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    code: Option<String>,
}

/// Redirect-flow callback: exchange the code, then sign in.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CodeRequest>,
) -> Result<Json<AuthResponse>> {
    let code = non_empty(body.code)
        .ok_or_else(|| AppError::Validation("Authorization code required".to_string()))?;

    tracing::info!("Exchanging Google authorization code");

    let id_token = state.google_oauth.exchange_code(&code).await?;

    exchange_id_token(&state, &id_token, SyncMode::ExistingOnly).await
}

#[derive(Deserialize)]
pub struct IdTokenRequest {
    #[serde(default)]
    token: Option<String>,
}

/// Sign in with a Google ID token (existing accounts only).
async fn sign_in(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<IdTokenRequest>,
) -> Result<Json<AuthResponse>> {
    let token =
        non_empty(body.token).ok_or_else(|| AppError::Validation("Token required".to_string()))?;

    exchange_id_token(&state, &token, SyncMode::ExistingOnly).await
}

/// Sign up with a Google ID token (creates the account if needed).
async fn sign_up(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<IdTokenRequest>,
) -> Result<Json<AuthResponse>> {
    let token =
        non_empty(body.token).ok_or_else(|| AppError::Validation("Token required".to_string()))?;

    exchange_id_token(&state, &token, SyncMode::CreateIfMissing).await
}

/// Verify the ID token, sync the user, issue a session.
async fn exchange_id_token(
    state: &AppState,
    id_token: &str,
    mode: SyncMode,
) -> Result<Json<AuthResponse>> {
    let identity = state.google_oidc_verifier.verify_id_token(id_token).await?;

    let synced = sync_google_user(state.store.as_ref(), &identity, mode)
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::NotRegistered) {
                tracing::info!("Sign-in rejected: no account for Google identity");
            }
        })?;

    tracing::info!(
        user_id = synced.user.id,
        created = synced.created,
        mode = ?mode,
        "Google sign-in succeeded"
    );

    Ok(Json(build_auth_response(
        &synced.user,
        &state.config.jwt_secret,
    )?))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("abc".to_string())), Some("abc".to_string()));
    }
}
