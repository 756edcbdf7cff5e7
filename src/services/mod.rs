// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod account;
pub mod bmi;
pub mod google_oauth;
pub mod google_oidc;

pub use account::{AuthResponse, SyncMode};
pub use bmi::{BmiInputError, BmiReading};
pub use google_oauth::GoogleOAuthClient;
pub use google_oidc::{GoogleIdentity, GoogleOidcVerifier, IdentityError};
