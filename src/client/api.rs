// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed HTTP client for the BMI Tracker API.

use crate::models::BmiRecord;
use crate::services::account::AuthResponse;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body.
    #[error("HTTP {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("not signed in")]
    NotSignedIn,

    #[error("session file error: {0}")]
    Session(String),
}

/// Operations the BMI form needs from the backend.
#[async_trait]
pub trait BmiBackend: Send + Sync {
    async fn save_bmi(
        &self,
        token: &str,
        height: f64,
        weight: f64,
        bmi: f64,
    ) -> Result<BmiRecord, ClientError>;

    async fn history(&self, token: &str) -> Result<Vec<BmiRecord>, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthUrlBody {
    auth_url: String,
}

#[derive(Deserialize)]
struct CreatedBody {
    record: BmiRecord,
}

#[derive(Deserialize)]
struct HistoryBody {
    records: Vec<BmiRecord>,
}

#[derive(Serialize)]
struct SaveBody {
    height: f64,
    weight: f64,
    bmi: f64,
}

/// HTTP client bound to one API base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Google consent URL for the redirect flow.
    pub async fn auth_url(&self) -> Result<String, ClientError> {
        let response = self.http.get(self.url("/auth/google")).send().await?;
        let body: AuthUrlBody = parse_json(response).await?;
        Ok(body.auth_url)
    }

    /// Create (or refresh) an account from a Google ID token.
    pub async fn sign_up(&self, id_token: &str) -> Result<AuthResponse, ClientError> {
        self.post_token("/auth/google/signup", id_token).await
    }

    /// Sign in to an existing account with a Google ID token.
    pub async fn sign_in(&self, id_token: &str) -> Result<AuthResponse, ClientError> {
        self.post_token("/auth/google/verify", id_token).await
    }

    /// Sign in with an authorization code from the redirect flow.
    pub async fn sign_in_with_code(&self, code: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/google/callback"))
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await?;
        parse_json(response).await
    }

    async fn post_token(&self, path: &str, id_token: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .json(&serde_json::json!({ "token": id_token }))
            .send()
            .await?;
        parse_json(response).await
    }

    /// Delete all of the caller's records.
    pub async fn clear_history(&self, token: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url("/api/bmi/history"))
            .bearer_auth(token)
            .send()
            .await?;
        let _: serde_json::Value = parse_json(response).await?;
        Ok(())
    }

    /// Liveness probe.
    pub async fn health(&self) -> Result<(), ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        let _: serde_json::Value = parse_json(response).await?;
        Ok(())
    }

    /// Whether a page exists on the frontend (HEAD request, no caching).
    pub async fn page_exists(&self, frontend_url: &str, page: &str) -> bool {
        let url = format!("{}/{}", frontend_url.trim_end_matches('/'), page);
        match self
            .http
            .head(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "Page probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl BmiBackend for ApiClient {
    async fn save_bmi(
        &self,
        token: &str,
        height: f64,
        weight: f64,
        bmi: f64,
    ) -> Result<BmiRecord, ClientError> {
        let response = self
            .http
            .post(self.url("/api/bmi"))
            .bearer_auth(token)
            .json(&SaveBody {
                height,
                weight,
                bmi,
            })
            .send()
            .await?;
        let body: CreatedBody = parse_json(response).await?;
        Ok(body.record)
    }

    async fn history(&self, token: &str) -> Result<Vec<BmiRecord>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/bmi/history"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: HistoryBody = parse_json(response).await?;
        Ok(body.records)
    }
}

/// Decode a success body, or turn an error body into [`ClientError::Api`].
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    Err(ClientError::Api { status, message })
}
