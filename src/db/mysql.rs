// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MySQL-backed store.

use super::{Store, SCHEMA_SQL};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{BmiRecord, GoogleProfile, NewBmiRecord, User};
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// MySQL store over a bounded connection pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect using the `DB_*` settings.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.db_pool_size)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&config.database_url())
            .await
            .map_err(|e| AppError::storage("Failed to connect to database", e))?;

        tracing::info!(
            host = %config.db_host,
            database = %config.db_name,
            pool_size = config.db_pool_size,
            "Connected to MySQL"
        );

        Ok(Self { pool })
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::storage("Failed to create schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn find_user_by_google_id_or_email(
        &self,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, google_id, email, name, picture FROM users \
             WHERE google_id = ? OR email = ? ORDER BY id LIMIT 1",
        )
        .bind(google_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to look up user", e))
    }

    async fn insert_user(&self, profile: &GoogleProfile) -> Result<User, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (google_id, email, name, picture) VALUES (?, ?, ?, ?)",
        )
        .bind(&profile.google_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.picture)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to create user", e))?;

        Ok(User {
            id: result.last_insert_id(),
            google_id: profile.google_id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            picture: profile.picture.clone(),
        })
    }

    async fn update_user_profile(
        &self,
        user_id: u64,
        profile: &GoogleProfile,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET google_id = ?, name = ?, picture = ? WHERE id = ?")
            .bind(&profile.google_id)
            .bind(&profile.name)
            .bind(&profile.picture)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to update user", e))?;
        Ok(())
    }

    async fn insert_bmi_record(&self, record: &NewBmiRecord) -> Result<BmiRecord, AppError> {
        let result = sqlx::query(
            "INSERT INTO bmi_records (user_id, height, weight, bmi) VALUES (?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(record.height)
        .bind(record.weight)
        .bind(record.bmi)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to save BMI record", e))?;

        // Read back so the timestamp is the one the database assigned.
        sqlx::query_as::<_, BmiRecord>(
            "SELECT id, user_id, height, weight, bmi, recorded_at FROM bmi_records WHERE id = ?",
        )
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to save BMI record", e))
    }

    async fn list_bmi_records(&self, user_id: u64) -> Result<Vec<BmiRecord>, AppError> {
        sqlx::query_as::<_, BmiRecord>(
            "SELECT id, user_id, height, weight, bmi, recorded_at FROM bmi_records \
             WHERE user_id = ? ORDER BY recorded_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("Failed to fetch BMI history", e))
    }

    async fn delete_bmi_records(&self, user_id: u64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM bmi_records WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage("Failed to clear BMI history", e))?;
        Ok(result.rows_affected())
    }
}
