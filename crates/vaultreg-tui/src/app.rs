//! Application state management for vaultreg.
//!
//! This module contains the `App` struct that owns one registration session:
//! the `FormController`, which input has focus, and the channel that carries
//! submission outcomes back from the background task.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};
use vaultreg_core::{
    ApiClient, Config, Field, FieldKind, FormController, Group, MemberDraft, MemberRegistrar,
    SubmitOutcome, SubmitRejected,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the submit outcome channel.
/// Only one submission can be in flight, so a small buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 4;

/// Maximum length for free-text inputs.
const MAX_TEXT_LENGTH: usize = 100;

/// Length of a `YYYY-MM-DD` date.
const DATE_LENGTH: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Editing,
    ConfirmingQuit,
    Quitting,
}

/// Which element of the form has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Field(Field),
    Submit,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    /// Endpoint the registrar posts to, as shown in the title bar.
    pub endpoint: String,
    pub form: FormController,

    pub state: AppState,
    pub focus: FormFocus,

    // Background submit channel
    submit_tx: mpsc::Sender<SubmitOutcome>,
    submit_rx: mpsc::Receiver<SubmitOutcome>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance talking to the configured endpoint
    pub fn new() -> Result<Self> {
        let config = Config::load_or_default();
        let api = ApiClient::new(&config)?;
        info!(endpoint = %api.endpoint(), "Registration endpoint configured");
        let endpoint = api.endpoint().to_string();
        Ok(Self::with_registrar(endpoint, Arc::new(api)))
    }

    pub fn with_registrar(endpoint: impl Into<String>, registrar: Arc<dyn MemberRegistrar>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            endpoint: endpoint.into(),
            form: FormController::new(registrar),
            state: AppState::Editing,
            focus: FormFocus::Field(Field::FirstName),
            submit_tx: tx,
            submit_rx: rx,
            status_message: None,
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Focusable elements in display order, skipping hidden conditional fields.
    pub fn focus_order(&self) -> Vec<FormFocus> {
        let values = self.form.values();
        Field::ALL
            .iter()
            .copied()
            .filter(|f| values.is_visible(*f))
            .map(FormFocus::Field)
            .chain(std::iter::once(FormFocus::Submit))
            .collect()
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, step: isize) {
        let order = self.focus_order();
        let len = order.len() as isize;
        self.focus = match order.iter().position(|f| *f == self.focus) {
            Some(i) => order[(i as isize + step).rem_euclid(len) as usize],
            None => order[0],
        };
    }

    pub fn focused_field(&self) -> Option<Field> {
        match self.focus {
            FormFocus::Field(field) => Some(field),
            FormFocus::Submit => None,
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Type a character into the focused input.
    pub fn type_char(&mut self, c: char) {
        let Some(field) = self.focused_field() else {
            return;
        };

        match field.kind() {
            FieldKind::Text | FieldKind::Date => {
                let mut text = self.form.values().text(field).unwrap_or_default().to_string();
                if can_add_field_char(field, text.chars().count(), c) {
                    text.push(c);
                    self.set_text(field, text);
                }
            }
            FieldKind::Choice => {
                if c.is_ascii_digit() {
                    self.set_text(field, c.to_string());
                }
            }
            FieldKind::Flag => {
                if c == ' ' {
                    self.toggle_focused();
                }
            }
        }
    }

    /// Delete the last character of the focused input.
    pub fn backspace(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Text | FieldKind::Date => {
                let mut text = self.form.values().text(field).unwrap_or_default().to_string();
                text.pop();
                self.set_text(field, text);
            }
            FieldKind::Choice => self.set_text(field, String::new()),
            FieldKind::Flag => {}
        }
    }

    /// Step the group selector forward or backward.
    pub fn cycle_group(&mut self, forward: bool) {
        let next = match self.form.values().selected_group() {
            Some(group) if forward => group.next(),
            Some(group) => group.prev(),
            None if forward => Group::Transformers,
            None => Group::Revolutionaries,
        };
        self.set_text(Field::Group, next.id_string());
    }

    pub fn toggle_focused(&mut self) {
        if let Some(field) = self.focused_field() {
            if field.kind() == FieldKind::Flag {
                if let Err(e) = self.form.toggle(field) {
                    debug!(error = %e, "Toggle ignored");
                }
            }
        }
    }

    fn set_text(&mut self, field: Field, text: String) {
        if let Err(e) = self.form.set_field(field, text) {
            debug!(error = %e, "Edit ignored");
        }
    }

    /// Enter on the focused element: advance, toggle or submit.
    pub fn activate(&mut self) {
        match self.focus {
            FormFocus::Submit => self.start_submit(),
            FormFocus::Field(field) if field.kind() == FieldKind::Flag => self.toggle_focused(),
            FormFocus::Field(_) => self.focus_next(),
        }
    }

    /// Clear the draft and start over.
    pub fn reset_form(&mut self) {
        self.form.reset();
        self.focus = FormFocus::Field(Field::FirstName);
        self.status_message = Some("Form cleared".to_string());
    }

    pub fn has_unsaved_input(&self) -> bool {
        self.form.values() != &MemberDraft::default()
    }

    /// Leave the form. The draft is discarded, never saved.
    pub fn discard_and_quit(&mut self) {
        if self.has_unsaved_input() {
            info!("Discarding unsent registration draft");
        }
        self.form.reset();
        self.state = AppState::Quitting;
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate and, if valid, send the registration on a background task.
    pub fn start_submit(&mut self) {
        match self.form.begin_submit() {
            Ok(ticket) => {
                let tx = self.submit_tx.clone();
                tokio::spawn(async move {
                    let outcome = ticket.dispatch().await;
                    if tx.send(outcome).await.is_err() {
                        debug!("App closed before submission finished, dropping outcome");
                    }
                });
                self.status_message = None;
            }
            Err(SubmitRejected::Invalid(errors)) => {
                if let Some(first) = errors.keys().next() {
                    self.focus = FormFocus::Field(*first);
                }
                self.status_message = Some(format!(
                    "{} field(s) need attention",
                    errors.len()
                ));
            }
            Err(SubmitRejected::InFlight) => {
                self.status_message = Some("Still submitting...".to_string());
            }
        }
    }

    /// Apply any submission outcomes that have arrived.
    pub fn check_background_tasks(&mut self) {
        while let Ok(outcome) = self.submit_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: SubmitOutcome) {
        if self.form.complete_submit(outcome) && !self.has_unsaved_input() {
            // Successful submit cleared the draft; start the next one at the top
            self.focus = FormFocus::Field(Field::FirstName);
        }
    }
}

// ============================================================================
// Input Validation
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be accepted into a text or date field
pub fn can_add_field_char(field: Field, current_len: usize, c: char) -> bool {
    if !is_valid_input_char(c) {
        return false;
    }
    match field.kind() {
        FieldKind::Date => current_len < DATE_LENGTH && (c.is_ascii_digit() || c == '-'),
        _ if field == Field::Phone => {
            current_len < MAX_TEXT_LENGTH && (c.is_ascii_digit() || "+-() ".contains(c))
        }
        _ => current_len < MAX_TEXT_LENGTH,
    }
}

// ============================================================================
// Tests
// ============================================================================
