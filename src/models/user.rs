//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User row in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Internal ID (auto-increment)
    pub id: u64,
    /// Google subject ID (unique)
    pub google_id: String,
    /// Email address (unique)
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Avatar URL
    pub picture: Option<String>,
}

/// Profile fields taken from a verified Google identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// User projection returned to clients. Never carries the Google subject ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: u64,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
        }
    }
}
