// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod bmi;
pub mod user;

pub use bmi::{BmiRecord, NewBmiRecord};
pub use user::{GoogleProfile, PublicUser, User};
