//! Form state and submit lifecycle.
//!
//! `FormController` owns one registration session: the draft, which fields
//! the user has touched, the current validation errors and the submit phase.
//! Rendering code reads that state and calls back into `set_field` and
//! `submit`; it never mutates the draft directly.

pub mod controller;
pub mod rules;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{Field, FieldKind};

pub use controller::{FormController, SubmitOutcome, SubmitPhase, SubmitTicket};

/// Per-field validation messages. Empty means the draft is valid.
pub type ValidationErrors = BTreeMap<Field, String>;

/// Misuse of the form API (as opposed to invalid user input).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} expects a {expected:?} value")]
    KindMismatch { field: Field, expected: FieldKind },
}

/// Why a submit was not started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(ValidationErrors),

    #[error("A submission is already in progress")]
    InFlight,
}
