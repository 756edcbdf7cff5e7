// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth 2.0 web-server flow: consent URL and code exchange.

use crate::config::Config;
use crate::services::google_oidc::IdentityError;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const SCOPES: &str = "openid profile email";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
}

impl GoogleOAuthClient {
    /// Create a client from application config.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building OAuth HTTP client")?;

        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            token_url: TOKEN_URL.to_string(),
        })
    }

    /// Point the code exchange at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// URL of Google's consent screen for this application.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?\
             access_type=offline&\
             scope={}&\
             prompt=consent&\
             response_type=code&\
             client_id={}&\
             redirect_uri={}",
            AUTHORIZE_URL,
            urlencoding::encode(SCOPES),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
        )
    }

    /// Exchange an authorization code for the ID token Google issues with it.
    pub async fn exchange_code(&self, code: &str) -> Result<String, IdentityError> {
        if self.client_id.is_empty() {
            return Err(IdentityError::NotConfigured);
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::Transient(format!("token request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(IdentityError::Transient(format!(
                "token endpoint returned status {status}"
            )));
        }

        if !status.is_success() {
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            return Err(IdentityError::CodeExchange(format!(
                "HTTP {}: {} {}",
                status,
                body.error,
                body.error_description.unwrap_or_default()
            )));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::CodeExchange(format!("invalid token response: {e}")))?;

        tokens.id_token.ok_or_else(|| {
            IdentityError::CodeExchange("token response did not include an id_token".to_string())
        })
    }
}

/// Token endpoint success response; only the ID token is used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_contains_consent_parameters() {
        let client = GoogleOAuthClient::new(&Config::test_default()).unwrap();
        let url = client.authorization_url();

        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20profile%20email"));
        assert!(url.contains("client_id=test-client-id.apps.googleusercontent.com"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"
        ));
    }

    #[tokio::test]
    async fn test_exchange_requires_client_id() {
        let mut config = Config::test_default();
        config.google_client_id = String::new();
        let client = GoogleOAuthClient::new(&config).unwrap();

        let err = client.exchange_code("abc").await.unwrap_err();
        assert!(matches!(err, IdentityError::NotConfigured));
    }

    #[tokio::test]
    async fn test_exchange_unreachable_endpoint_is_transient() {
        let client = GoogleOAuthClient::new(&Config::test_default())
            .unwrap()
            .with_token_url("http://127.0.0.1:9/token");

        let err = client.exchange_code("abc").await.unwrap_err();
        assert!(matches!(err, IdentityError::Transient(_)));
    }
}
