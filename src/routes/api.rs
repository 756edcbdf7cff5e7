// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BMI history routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{BmiRecord, NewBmiRecord};
use crate::routes::JsonBody;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

const FIELDS_REQUIRED: &str = "Height, weight, and BMI are required";

/// API routes (require authentication via session token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bmi", post(create_record))
        .route("/api/bmi/history", get(get_history).delete(clear_history))
}

// ─── Create ──────────────────────────────────────────────────

/// Body of `POST /api/bmi`.
///
/// Bounds match the client form (see `services::bmi`).
/// Numbers may also arrive as numeric strings (`"180"`).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBmiRequest {
    #[serde(default, deserialize_with = "number_or_text")]
    #[validate(range(min = 50.0, max = 250.0, message = "Height must be between 50 and 250 cm"))]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "number_or_text")]
    #[validate(range(min = 10.0, max = 300.0, message = "Weight must be between 10 and 300 kg"))]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "number_or_text")]
    #[validate(range(min = 1.0, max = 1200.0, message = "BMI is out of range"))]
    pub bmi: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accept a JSON number or a string holding one. Other strings count as absent.
fn number_or_text<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(value)) => Some(value),
        Some(NumberOrText::Text(text)) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        None => None,
    })
}

#[derive(Serialize)]
pub struct CreateBmiResponse {
    pub success: bool,
    pub record: BmiRecord,
}

/// Store one BMI reading for the caller.
async fn create_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateBmiRequest>,
) -> Result<Json<CreateBmiResponse>> {
    // Zero counts as missing
    let present = |v: Option<f64>| v.filter(|v| *v != 0.0);
    let (Some(height), Some(weight), Some(bmi)) =
        (present(body.height), present(body.weight), present(body.bmi))
    else {
        return Err(AppError::Validation(FIELDS_REQUIRED.to_string()));
    };

    body.validate()
        .map_err(|e| AppError::Validation(first_validation_message(&e)))?;

    let record = state
        .store
        .insert_bmi_record(&NewBmiRecord {
            user_id: user.user_id,
            height,
            weight,
            bmi,
        })
        .await?;

    tracing::debug!(user_id = user.user_id, record_id = record.id, "Saved BMI record");

    Ok(Json(CreateBmiResponse {
        success: true,
        record,
    }))
}

/// Pick a stable message: fields are checked in declaration order.
fn first_validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    ["height", "weight", "bmi"]
        .iter()
        .find_map(|field| field_errors.get(*field))
        .and_then(|errs| errs.first())
        .and_then(|err| err.message.as_ref())
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| "Invalid BMI record".to_string())
}

// ─── History ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HistoryResponse {
    pub records: Vec<BmiRecord>,
}

/// List the caller's readings, newest first.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HistoryResponse>> {
    let records = state.store.list_bmi_records(user.user_id).await?;

    tracing::debug!(
        user_id = user.user_id,
        count = records.len(),
        "Fetched BMI history"
    );

    Ok(Json(HistoryResponse { records }))
}

#[derive(Serialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub message: String,
}

/// Delete all of the caller's readings.
async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ClearHistoryResponse>> {
    let deleted = state.store.delete_bmi_records(user.user_id).await?;

    tracing::info!(user_id = user.user_id, deleted, "Cleared BMI history");

    Ok(Json(ClearHistoryResponse {
        success: true,
        message: "History cleared".to_string(),
    }))
}
