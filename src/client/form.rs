// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BMI form submission flow and history rendering.

use super::api::BmiBackend;
use crate::models::BmiRecord;
use crate::services::bmi::BmiReading;
use crate::time_utils::format_local;

/// Shown when the user has no saved readings.
pub const EMPTY_HISTORY: &str = "No records yet.";

/// Result of one form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOutcome {
    /// Message shown under the form (result or input warning)
    pub message: String,
    /// The accepted reading, if input was valid
    pub reading: Option<BmiReading>,
    /// Refreshed history, if it could be loaded
    pub history: Option<Vec<BmiRecord>>,
}

/// Compute BMI from raw form fields, persist it, and reload history.
///
/// Rejected input never reaches the backend. Save and reload failures are
/// logged and otherwise ignored so the computed result is always shown.
pub async fn submit(
    backend: &dyn BmiBackend,
    token: Option<&str>,
    height: &str,
    weight: &str,
) -> FormOutcome {
    let reading = match BmiReading::parse(height, weight) {
        Ok(reading) => reading,
        Err(e) => {
            return FormOutcome {
                message: e.to_string(),
                reading: None,
                history: None,
            }
        }
    };

    let message = reading.to_string();

    let Some(token) = token else {
        tracing::warn!("No session token; BMI not saved");
        return FormOutcome {
            message,
            reading: Some(reading),
            history: None,
        };
    };

    if let Err(e) = backend
        .save_bmi(
            token,
            reading.height_cm,
            reading.weight_kg,
            reading.rounded(),
        )
        .await
    {
        tracing::error!(error = %e, "Failed to save BMI");
    }

    let history = match backend.history(token).await {
        Ok(records) => Some(records),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load BMI history");
            None
        }
    };

    FormOutcome {
        message,
        reading: Some(reading),
        history,
    }
}

/// One history line, timestamp in local time.
pub fn render_record(record: &BmiRecord) -> String {
    format!(
        "{} → BMI: {:.2} (H: {}cm, W: {}kg)",
        format_local(record.recorded_at),
        record.bmi,
        record.height,
        record.weight
    )
}

/// History as display lines, in the order given (server returns newest first).
pub fn render_history(records: &[BmiRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![EMPTY_HISTORY.to_string()];
    }
    records.iter().map(render_record).collect()
}
