// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google ID token verification for Sign-In with Google.

use crate::config::Config;
use anyhow::Context;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const DEFAULT_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Issuers Google uses for ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Identity extracted from a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Google subject ID (`sub`)
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Identity verification failures.
///
/// Display strings carry the full detail for logs; clients only ever see
/// [`IdentityError::client_message`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("Google client ID is not configured")]
    NotConfigured,

    #[error("ID token has expired")]
    Expired,

    #[error("ID token audience does not match client ID")]
    AudienceMismatch,

    #[error("ID token rejected: {0}")]
    Verification(String),

    #[error("authorization code exchange failed: {0}")]
    CodeExchange(String),

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("email domain is not allowed")]
    EmailDomain,

    /// Google endpoints were unreachable or returned garbage.
    #[error("transient Google failure: {0}")]
    Transient(String),
}

impl IdentityError {
    /// Sanitized message returned to API clients.
    pub fn client_message(&self) -> &'static str {
        match self {
            IdentityError::NotConfigured => "Server configuration error",
            IdentityError::Expired => "Token has expired. Please try signing in again.",
            IdentityError::AudienceMismatch => {
                "Token audience mismatch. Please check Google Client ID configuration."
            }
            IdentityError::Verification(_) => "Token verification failed",
            IdentityError::CodeExchange(_) => "Authentication failed",
            IdentityError::UnverifiedEmail => "Google account is not verified",
            IdentityError::EmailDomain => "Only Gmail addresses are allowed for signup",
            IdentityError::Transient(_) => {
                "Google sign-in is temporarily unavailable. Please try again."
            }
        }
    }
}

#[derive(Clone)]
enum VerifierMode {
    Google,
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

type KeyMap = HashMap<String, Arc<DecodingKey>>;

/// A fetched value and the instant it goes stale.
struct Cached<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Cached<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn fresh(&self) -> Option<&T> {
        (self.expires_at > Instant::now()).then_some(&self.value)
    }
}

/// Verifier for Google-issued ID tokens.
pub struct GoogleOidcVerifier {
    http_client: reqwest::Client,
    expected_audience: String,
    mode: VerifierMode,
    jwks_uri: RwLock<Option<Cached<String>>>,
    keys: RwLock<Option<Cached<KeyMap>>>,
    /// Serializes key refreshes so a burst of sign-ins fetches once.
    refresh_lock: Mutex<()>,
}

impl GoogleOidcVerifier {
    /// Create a production verifier that discovers and caches Google JWKS keys.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self::with_mode(config, VerifierMode::Google)?;

        if verifier.expected_audience.is_empty() {
            tracing::warn!("GOOGLE_CLIENT_ID is not set; Google sign-in will be rejected");
        } else {
            tracing::info!(
                expected_audience = %verifier.expected_audience,
                "Initialized Google ID token verifier"
            );
        }

        Ok(verifier)
    }

    /// Create a verifier with a static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static OIDC kid must not be empty");
        }

        Self::with_mode(
            config,
            VerifierMode::StaticKey {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn with_mode(config: &Config, mode: VerifierMode) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building OIDC HTTP client")?;

        Ok(Self {
            http_client,
            expected_audience: config.google_client_id.trim().to_string(),
            mode,
            jwks_uri: RwLock::new(None),
            keys: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify a Google ID token: signature, issuer, audience, expiry.
    ///
    /// Email policy (verified flag, allowed domain) is left to the caller.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleIdentity, IdentityError> {
        if self.expected_audience.is_empty() {
            return Err(IdentityError::NotConfigured);
        }

        let header = decode_header(id_token)
            .map_err(|e| IdentityError::Verification(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::Verification(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Verification("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[self.expected_audience.as_str()]);
        validation.validate_nbf = true;
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<GoogleIdTokenClaims>(id_token, decoding_key.as_ref(), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                ErrorKind::InvalidAudience => IdentityError::AudienceMismatch,
                _ => IdentityError::Verification(format!("JWT validation failed: {e}")),
            })?;

        let claims = token_data.claims;

        tracing::debug!(
            subject = %claims.sub,
            email_verified = ?claims.email_verified,
            issuer = %claims.iss,
            exp = claims.exp,
            "Google ID token claims"
        );

        validate_iat(claims.iat)?;

        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| IdentityError::Verification("missing email claim".to_string()))?;

        Ok(GoogleIdentity {
            subject: claims.sub,
            email,
            email_verified: claims.email_verified.unwrap_or(false),
            name: claims.name,
            picture: claims.picture,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, IdentityError> {
        if let VerifierMode::StaticKey {
            kid: static_kid,
            decoding_key,
        } = &self.mode
        {
            return if kid == static_kid {
                Ok(decoding_key.clone())
            } else {
                Err(IdentityError::Verification(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )))
            };
        }

        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        // Google rotates keys; a miss may just mean our cache is stale.
        for force in [false, true] {
            if let Some(key) = self.load_keys(force).await?.get(kid) {
                return Ok(key.clone());
            }
        }

        Err(IdentityError::Verification(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        self.keys
            .read()
            .await
            .as_ref()
            .and_then(Cached::fresh)
            .and_then(|keys| keys.get(kid))
            .cloned()
    }

    /// Current key set, fetched from Google unless a fresh copy is cached.
    async fn load_keys(&self, force: bool) -> Result<KeyMap, IdentityError> {
        let _guard = self.refresh_lock.lock().await;

        if !force {
            if let Some(keys) = self.keys.read().await.as_ref().and_then(Cached::fresh) {
                return Ok(keys.clone());
            }
        }

        let jwks_uri = self.jwks_uri(force).await;
        tracing::debug!(jwks_uri = %jwks_uri, "Refreshing Google JWKS cache");

        let (keys, ttl) = fetch_jwks(&self.http_client, &jwks_uri).await?;
        *self.keys.write().await = Some(Cached::new(keys.clone(), ttl));

        tracing::debug!(
            ttl_secs = ttl.as_secs(),
            keys = keys.len(),
            "Google JWKS cache refreshed"
        );
        Ok(keys)
    }

    /// JWKS location from OIDC discovery, falling back to the last known
    /// or the well-known URI when discovery fails.
    async fn jwks_uri(&self, force: bool) -> String {
        let previous = {
            let cache = self.jwks_uri.read().await;
            if !force {
                if let Some(uri) = cache.as_ref().and_then(Cached::fresh) {
                    return uri.clone();
                }
            }
            cache.as_ref().map(|c| c.value.clone())
        };

        match fetch_discovery(&self.http_client).await {
            Ok((uri, ttl)) => {
                *self.jwks_uri.write().await = Some(Cached::new(uri.clone(), ttl));
                uri
            }
            Err(e) => {
                tracing::warn!(error = %e, "OIDC discovery failed; using fallback JWKS URI");
                previous.unwrap_or_else(|| DEFAULT_JWKS_URL.to_string())
            }
        }
    }
}

async fn fetch_discovery(http: &reqwest::Client) -> Result<(String, Duration), String> {
    let response = http
        .get(DISCOVERY_URL)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("status {}", response.status()));
    }

    let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);
    let config: OpenIdConfig = response.json().await.map_err(|e| e.to_string())?;
    Ok((config.jwks_uri, ttl))
}

async fn fetch_jwks(
    http: &reqwest::Client,
    jwks_uri: &str,
) -> Result<(KeyMap, Duration), IdentityError> {
    let response = http
        .get(jwks_uri)
        .send()
        .await
        .map_err(|e| IdentityError::Transient(format!("JWKS request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(IdentityError::Transient(format!(
            "JWKS request returned status {}",
            response.status()
        )));
    }

    let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);
    let jwks: Jwks = response
        .json()
        .await
        .map_err(|e| IdentityError::Transient(format!("invalid JWKS JSON: {e}")))?;

    let keys = usable_keys(jwks);
    if keys.is_empty() {
        return Err(IdentityError::Transient(
            "JWKS response did not include any usable RSA keys".to_string(),
        ));
    }

    Ok((keys, ttl))
}

#[derive(Debug, Deserialize)]
struct OpenIdConfig {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleIdTokenClaims {
    iss: String,
    sub: String,
    exp: usize,
    iat: Option<usize>,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

/// Keep RS256 signing keys only, indexed by `kid`.
fn usable_keys(jwks: Jwks) -> KeyMap {
    jwks.keys
        .into_iter()
        .filter(|jwk| jwk.kty == "RSA" && !jwk.kid.trim().is_empty())
        .filter(|jwk| jwk.alg.as_deref().map_or(true, |alg| alg == "RS256"))
        .filter(|jwk| jwk.use_.as_deref().map_or(true, |use_| use_ == "sig"))
        .filter_map(|jwk| match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => Some((jwk.kid, Arc::new(key))),
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
                None
            }
        })
        .collect()
}

fn validate_iat(iat: Option<usize>) -> Result<(), IdentityError> {
    let now = now_unix_secs();

    let Some(iat) = iat else {
        return Err(IdentityError::Verification("missing iat claim".to_string()));
    };

    if iat as u64 > now + CLOCK_SKEW_SECS {
        return Err(IdentityError::Verification(
            "iat claim is in the future".to_string(),
        ));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    let Some(max_age) = headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
    else {
        return fallback;
    };

    Duration::from_secs(max_age)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    for directive in value.split(',') {
        let directive = directive.trim();

        if let Some(raw) = directive.strip_prefix("max-age=") {
            let raw = raw.trim_matches('"');
            if let Ok(seconds) = raw.parse::<u64>() {
                return Some(seconds);
            }
        }
    }

    None
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
