// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for tests and local runs without MySQL.

use super::Store;
use crate::error::AppError;
use crate::models::{BmiRecord, GoogleProfile, NewBmiRecord, User};
use async_trait::async_trait;
use chrono::SubsecRound;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    records: Vec<BmiRecord>,
    next_user_id: u64,
    next_record_id: u64,
}

/// Store that keeps both tables in memory.
///
/// Mirrors the MySQL constraints that matter to callers: unique Google ID
/// and email, per-user scoping, newest-first listing.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user rows.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Snapshot of a user row.
    pub async fn get_user(&self, user_id: u64) -> Option<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    /// Number of BMI rows across all users.
    pub async fn record_count(&self) -> usize {
        self.tables.read().await.records.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_google_id_or_email(
        &self,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.google_id == google_id || u.email == email)
            .cloned())
    }

    async fn insert_user(&self, profile: &GoogleProfile) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .iter()
            .any(|u| u.google_id == profile.google_id || u.email == profile.email)
        {
            return Err(AppError::storage(
                "Failed to create user",
                "duplicate google_id or email",
            ));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            google_id: profile.google_id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            picture: profile.picture.clone(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user_profile(
        &self,
        user_id: u64,
        profile: &GoogleProfile,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .iter()
            .any(|u| u.id != user_id && u.google_id == profile.google_id)
        {
            return Err(AppError::storage(
                "Failed to update user",
                "duplicate google_id",
            ));
        }

        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.google_id = profile.google_id.clone();
            user.name = profile.name.clone();
            user.picture = profile.picture.clone();
        }
        Ok(())
    }

    async fn insert_bmi_record(&self, record: &NewBmiRecord) -> Result<BmiRecord, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == record.user_id) {
            return Err(AppError::storage(
                "Failed to save BMI record",
                format!("foreign key violation: user {} does not exist", record.user_id),
            ));
        }

        tables.next_record_id += 1;
        let stored = BmiRecord {
            id: tables.next_record_id,
            user_id: record.user_id,
            height: record.height,
            weight: record.weight,
            bmi: record.bmi,
            // MySQL TIMESTAMP has second precision
            recorded_at: chrono::Utc::now().trunc_subsecs(0),
        };
        tables.records.push(stored.clone());
        Ok(stored)
    }

    async fn list_bmi_records(&self, user_id: u64) -> Result<Vec<BmiRecord>, AppError> {
        let tables = self.tables.read().await;
        let mut records: Vec<BmiRecord> = tables
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn delete_bmi_records(&self, user_id: u64) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.records.len();
        tables.records.retain(|r| r.user_id != user_id);
        Ok((before - tables.records.len()) as u64)
    }
}
