// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Linking verified Google identities to local accounts.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_session_token;
use crate::models::{GoogleProfile, PublicUser, User};
use crate::services::google_oidc::{GoogleIdentity, IdentityError};
use serde::{Deserialize, Serialize};

/// Only consumer Gmail accounts may sign up.
const ALLOWED_EMAIL_DOMAIN: &str = "@gmail.com";

/// Whether an unknown identity may create a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Sign-up: create the user if missing.
    CreateIfMissing,
    /// Sign-in: the user must already exist.
    ExistingOnly,
}

/// Outcome of [`sync_google_user`].
#[derive(Debug, Clone)]
pub struct SyncedUser {
    pub user: User,
    pub created: bool,
}

/// Session response returned by every successful exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Reject unverified or non-Gmail identities.
pub fn ensure_gmail_account(identity: &GoogleIdentity) -> std::result::Result<(), IdentityError> {
    if !identity.email_verified {
        return Err(IdentityError::UnverifiedEmail);
    }

    if !identity
        .email
        .to_ascii_lowercase()
        .ends_with(ALLOWED_EMAIL_DOMAIN)
    {
        return Err(IdentityError::EmailDomain);
    }

    Ok(())
}

/// Create or refresh the local user for a verified Google identity.
///
/// A user matching either the Google subject or the email is updated in
/// place; otherwise one is created when `mode` allows it.
pub async fn sync_google_user(
    store: &dyn Store,
    identity: &GoogleIdentity,
    mode: SyncMode,
) -> Result<SyncedUser> {
    ensure_gmail_account(identity)?;

    let profile = GoogleProfile {
        google_id: identity.subject.clone(),
        email: identity.email.clone(),
        name: identity.name.clone(),
        picture: identity.picture.clone(),
    };

    let existing = store
        .find_user_by_google_id_or_email(&profile.google_id, &profile.email)
        .await?;

    let Some(existing) = existing else {
        if mode == SyncMode::ExistingOnly {
            return Err(AppError::NotRegistered);
        }

        let user = store.insert_user(&profile).await?;
        tracing::info!(user_id = user.id, "Created user from Google sign-up");
        return Ok(SyncedUser {
            user,
            created: true,
        });
    };

    store.update_user_profile(existing.id, &profile).await?;
    tracing::info!(user_id = existing.id, "Refreshed user profile from Google");

    Ok(SyncedUser {
        user: User {
            google_id: profile.google_id,
            name: profile.name,
            picture: profile.picture,
            ..existing
        },
        created: false,
    })
}

/// Issue a session token and the sanitized user projection.
pub fn build_auth_response(user: &User, signing_key: &[u8]) -> Result<AuthResponse> {
    let token = create_session_token(user.id, &user.email, &user.google_id, signing_key)
        .map_err(|e| AppError::Internal(e.context("session token creation failed")))?;

    Ok(AuthResponse {
        token,
        user: PublicUser::from(user),
    })
}
