// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! BMI Tracker: record Body Mass Index readings per Google account.
//!
//! This crate provides the REST backend (Google sign-in, session tokens,
//! BMI history storage) and a client library used by the `bmi` CLI.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{GoogleOAuthClient, GoogleOidcVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub google_oidc_verifier: Arc<GoogleOidcVerifier>,
    pub google_oauth: GoogleOAuthClient,
}
