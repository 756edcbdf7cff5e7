//! Database layer.
//!
//! Handlers talk to a [`Store`] trait object so the MySQL implementation can
//! be swapped for [`MemoryStore`] in tests and offline development.

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use crate::error::AppError;
use crate::models::{BmiRecord, GoogleProfile, NewBmiRecord, User};
use async_trait::async_trait;

/// DDL for the application tables.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Persistence operations for users and BMI records.
#[async_trait]
pub trait Store: Send + Sync {
    /// First user whose Google ID or email matches.
    async fn find_user_by_google_id_or_email(
        &self,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, AppError>;

    /// Insert a new user row.
    async fn insert_user(&self, profile: &GoogleProfile) -> Result<User, AppError>;

    /// Overwrite Google ID, name and picture of an existing user.
    async fn update_user_profile(
        &self,
        user_id: u64,
        profile: &GoogleProfile,
    ) -> Result<(), AppError>;

    /// Insert one BMI record and return it with its server-assigned timestamp.
    async fn insert_bmi_record(&self, record: &NewBmiRecord) -> Result<BmiRecord, AppError>;

    /// All records of one user, newest first.
    async fn list_bmi_records(&self, user_id: u64) -> Result<Vec<BmiRecord>, AppError>;

    /// Delete every record of one user; returns the number removed.
    async fn delete_bmi_records(&self, user_id: u64) -> Result<u64, AppError>;
}
