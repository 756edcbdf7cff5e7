// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side session persistence.
//!
//! Holds the session token and the sanitized user in a small JSON file,
//! the CLI's stand-in for browser local storage.

use super::api::ClientError;
use crate::models::PublicUser;
use crate::services::account::AuthResponse;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default session file name, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".bmi-session.json";

/// What the client remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: PublicUser,
}

impl From<AuthResponse> for StoredSession {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

/// Where to send the user after logging out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutTarget {
    Login,
    Signup,
}

impl LogoutTarget {
    pub const LOGIN_PAGE: &'static str = "login.html";
    pub const SIGNUP_PAGE: &'static str = "signup.html";

    /// Login page if it exists, signup page otherwise.
    pub fn choose(login_page_exists: bool) -> Self {
        if login_page_exists {
            Self::Login
        } else {
            Self::Signup
        }
    }

    pub fn page(self) -> &'static str {
        match self {
            Self::Login => Self::LOGIN_PAGE,
            Self::Signup => Self::SIGNUP_PAGE,
        }
    }
}

/// JSON file holding a [`StoredSession`].
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session, if any. A corrupt file counts as signed out.
    pub fn load(&self) -> Option<StoredSession> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Ignoring unreadable session file");
                None
            }
        }
    }

    /// Token of the stored session.
    pub fn token(&self) -> Option<String> {
        self.load().map(|s| s.token)
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ClientError::Session(e.to_string()))
    }

    /// Forget the session. Missing file is not an error.
    pub fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> StoredSession {
        StoredSession {
            token: "tok".to_string(),
            user: PublicUser {
                id: 1,
                email: "ada@gmail.com".to_string(),
                name: Some("Ada".to_string()),
                picture: None,
            },
        }
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        assert!(file.load().is_none());
        file.save(&session()).unwrap();
        assert_eq!(file.load(), Some(session()));
        assert_eq!(file.token().as_deref(), Some("tok"));

        file.clear().unwrap();
        assert!(file.load().is_none());
        // Clearing twice is fine
        file.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(SessionFile::new(path).load().is_none());
    }

    #[test]
    fn test_logout_target() {
        assert_eq!(LogoutTarget::choose(true).page(), "login.html");
        assert_eq!(LogoutTarget::choose(false).page(), "signup.html");
    }
}
