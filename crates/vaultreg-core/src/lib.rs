//! Core library for vaultreg.
//!
//! This crate holds everything that is not rendering:
//!
//! - `models`: the member draft, field catalogue, group list and wire payload
//! - `form`: the `FormController` that owns a draft, validates it and drives
//!   the submit lifecycle
//! - `api`: the HTTP client that posts a registration to the remote endpoint
//! - `config`: endpoint and timeout configuration

pub mod api;
pub mod config;
pub mod form;
pub mod models;

pub use api::{ApiClient, ApiError, MemberRegistrar};
pub use config::Config;
pub use form::{FormController, FormError, SubmitOutcome, SubmitPhase, SubmitRejected, SubmitTicket};
pub use models::{Field, FieldKind, FieldValue, Group, MemberDraft, MemberPayload};
