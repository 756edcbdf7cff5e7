// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BMI calculation and input plausibility checks.
//!
//! Shared by the client form (which parses free text) and the API (which
//! re-checks the numbers it is asked to persist).

use std::fmt;
use std::ops::RangeInclusive;

/// Plausible human height in centimetres.
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 50.0..=250.0;
/// Plausible human weight in kilograms.
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 10.0..=300.0;

/// Why form input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BmiInputError {
    /// Not a number, or not positive.
    #[error("⚠️ Please enter valid values.")]
    Invalid,
    /// A positive number outside human bounds.
    #[error("⚠️ Please enter realistic values.")]
    Unrealistic,
}

/// Accepted measurements with their computed BMI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BmiReading {
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Unrounded BMI
    pub bmi: f64,
}

impl BmiReading {
    /// Compute BMI for already-parsed measurements.
    pub fn new(height_cm: f64, weight_kg: f64) -> Result<Self, BmiInputError> {
        check_measurements(height_cm, weight_kg)?;

        Ok(Self {
            height_cm,
            weight_kg,
            bmi: compute_bmi(height_cm, weight_kg),
        })
    }

    /// Parse free-text form fields and compute BMI.
    pub fn parse(height: &str, weight: &str) -> Result<Self, BmiInputError> {
        let height_cm = parse_number(height).ok_or(BmiInputError::Invalid)?;
        let weight_kg = parse_number(weight).ok_or(BmiInputError::Invalid)?;
        Self::new(height_cm, weight_kg)
    }

    /// BMI rounded to two decimals, the value shown and persisted.
    pub fn rounded(&self) -> f64 {
        round2(self.bmi)
    }
}

impl fmt::Display for BmiReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "✅ Your BMI is {:.2}", self.rounded())
    }
}

/// Validate height and weight: positive first, then plausible.
pub fn check_measurements(height_cm: f64, weight_kg: f64) -> Result<(), BmiInputError> {
    if !height_cm.is_finite() || !weight_kg.is_finite() || height_cm <= 0.0 || weight_kg <= 0.0 {
        return Err(BmiInputError::Invalid);
    }

    if !HEIGHT_RANGE_CM.contains(&height_cm) || !WEIGHT_RANGE_KG.contains(&weight_kg) {
        return Err(BmiInputError::Unrealistic);
    }

    Ok(())
}

/// `weight / (height in metres)^2`
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Round to two decimal places, taking the value its two-decimal text shows.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Lenient numeric parse: leading number, trailing junk ignored ("180cm").
///
/// Accepts an optional sign, a decimal mantissa, and an exponent ("1.8e2").
fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits(exp_start);
        if exp_digits > 0 {
            end = exp_start + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
