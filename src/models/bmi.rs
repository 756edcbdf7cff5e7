// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! BMI observation model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored BMI observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BmiRecord {
    pub id: u64,
    /// Owning user
    pub user_id: u64,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// BMI as computed and rounded by the client
    pub bmi: f64,
    /// Server-assigned timestamp
    #[serde(serialize_with = "crate::time_utils::serialize_rfc3339")]
    pub recorded_at: DateTime<Utc>,
}

/// Values needed to insert a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewBmiRecord {
    pub user_id: u64,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
}
