// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Every setting except the session signing secret has a default suitable
//! for local development. A `.env` file in the working directory is honoured.

use std::env;
use std::path::PathBuf;

/// Default OAuth redirect URI for local development.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/auth/google/callback";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Database ---
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    /// Maximum number of pooled connections
    pub db_pool_size: u32,

    // --- Google OAuth ---
    /// OAuth client ID; also the expected audience of Google ID tokens
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,

    // --- Server ---
    /// HS256 key for session tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
    pub port: u16,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Directory of frontend pages served for unmatched paths
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            db_host: env_or("DB_HOST", "localhost"),
            db_port: parse_or("DB_PORT", 3306),
            db_user: env_or("DB_USER", "root"),
            db_password: env::var("DB_PASSWORD").unwrap_or_default(),
            db_name: env_or("DB_NAME", "bmi_calculator"),
            db_pool_size: parse_or("DB_POOL_SIZE", 10),

            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            google_redirect_uri: env_or("GOOGLE_REDIRECT_URI", DEFAULT_REDIRECT_URI),

            jwt_secret: env::var("JWT_SECRET")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            port: parse_or("PORT", 3000),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000"),
            static_dir: env::var("STATIC_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            db_host: "localhost".to_string(),
            db_port: 3306,
            db_user: "root".to_string(),
            db_password: String::new(),
            db_name: "bmi_calculator_test".to_string(),
            db_pool_size: 2,
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            google_client_secret: "test_client_secret".to_string(),
            google_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
            static_dir: None,
        }
    }

    /// MySQL connection URL built from the individual `DB_*` settings.
    pub fn database_url(&self) -> String {
        format!("{}/{}", self.database_server_url(), self.db_name)
    }

    /// MySQL URL without a database selected.
    pub fn database_server_url(&self) -> String {
        let credentials = if self.db_password.is_empty() {
            urlencoding::encode(&self.db_user).into_owned()
        } else {
            format!(
                "{}:{}",
                urlencoding::encode(&self.db_user),
                urlencoding::encode(&self.db_password)
            )
        };

        format!("mysql://{}@{}:{}", credentials, self.db_host, self.db_port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
