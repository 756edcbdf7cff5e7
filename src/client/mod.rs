// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client library: the BMI form, its API client, and session storage.

pub mod api;
pub mod form;
pub mod session;

pub use api::{ApiClient, BmiBackend, ClientError};
pub use form::{render_history, submit, FormOutcome};
pub use session::{LogoutTarget, SessionFile, StoredSession};
