//! The registration form controller.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{rules, FormError, SubmitRejected, ValidationErrors};
use crate::api::error::NETWORK_FAILURE_MESSAGE;
use crate::api::{ApiError, MemberRegistrar};
use crate::models::{Field, FieldValue, MemberDraft, MemberPayload};

/// Banner text shown after a successful registration.
pub const SUCCESS_MESSAGE: &str = "Member registered successfully!";

/// Lifecycle of the most recent submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl SubmitPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmitPhase::Submitting)
    }

    /// Message for the banner under the form, if the phase has one.
    pub fn banner(&self) -> Option<&str> {
        match self {
            SubmitPhase::Succeeded => Some(SUCCESS_MESSAGE),
            SubmitPhase::Failed(message) => Some(message),
            SubmitPhase::Idle | SubmitPhase::Submitting => None,
        }
    }
}

/// A validated submission waiting to be sent.
///
/// Produced by `FormController::begin_submit`. Dispatching it performs the
/// single network attempt; the resulting `SubmitOutcome` is handed back to
/// `FormController::complete_submit`. The ticket owns everything it needs, so
/// it can be moved onto a background task.
pub struct SubmitTicket {
    generation: u64,
    payload: MemberPayload,
    registrar: Arc<dyn MemberRegistrar>,
}

impl SubmitTicket {
    pub async fn dispatch(self) -> SubmitOutcome {
        let result = self.registrar.register(&self.payload).await;
        SubmitOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Result of one dispatched submission.
#[derive(Debug)]
pub struct SubmitOutcome {
    generation: u64,
    pub result: Result<(), ApiError>,
}

/// Owns the state of one registration session.
pub struct FormController {
    values: MemberDraft,
    touched: BTreeSet<Field>,
    errors: ValidationErrors,
    phase: SubmitPhase,
    registrar: Arc<dyn MemberRegistrar>,
    /// Bumped on every reset; outcomes from an older generation are dropped.
    generation: u64,
}

impl FormController {
    pub fn new(registrar: Arc<dyn MemberRegistrar>) -> Self {
        Self {
            values: MemberDraft::default(),
            touched: BTreeSet::new(),
            errors: ValidationErrors::new(),
            phase: SubmitPhase::Idle,
            registrar,
            generation: 0,
        }
    }

    pub fn values(&self) -> &MemberDraft {
        &self.values
    }

    pub fn touched(&self) -> &BTreeSet<Field> {
        &self.touched
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn phase(&self) -> &SubmitPhase {
        &self.phase
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    /// The error to display for a field. Untouched fields show nothing.
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.is_touched(field) {
            self.errors.get(&field).map(String::as_str)
        } else {
            None
        }
    }

    /// Update one field, mark it touched and re-validate just that field.
    pub fn set_field(&mut self, field: Field, value: impl Into<FieldValue>) -> Result<(), FormError> {
        self.values.apply(field, value.into())?;
        self.touched.insert(field);
        match rules::validate_field(&self.values, field) {
            Some(message) => {
                self.errors.insert(field, message.to_string());
            }
            None => {
                self.errors.remove(&field);
            }
        }
        Ok(())
    }

    /// Same as `set_field`, addressing the field by its key (e.g. `"firstName"`).
    pub fn set_field_by_key(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let field: Field = key.parse()?;
        self.set_field(field, value)
    }

    /// Flip a flag field.
    pub fn toggle(&mut self, field: Field) -> Result<(), FormError> {
        let current = self.values.flag(field).ok_or(FormError::KindMismatch {
            field,
            expected: field.kind(),
        })?;
        self.set_field(field, !current)
    }

    /// Run every rule against the current draft. Does not touch stored state.
    pub fn validate_all(&self) -> ValidationErrors {
        rules::validate(&self.values)
    }

    pub fn can_submit(&self) -> bool {
        !self.phase.is_submitting() && self.validate_all().is_empty()
    }

    /// Validate and enter `Submitting`.
    ///
    /// On invalid input every required field is marked touched so its error
    /// becomes visible, and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitRejected> {
        if self.phase.is_submitting() {
            warn!("Submit requested while a submission is in flight");
            return Err(SubmitRejected::InFlight);
        }

        match MemberPayload::try_from(&self.values) {
            Ok(payload) => {
                self.errors.clear();
                self.phase = SubmitPhase::Submitting;
                debug!(generation = self.generation, "Submission started");
                Ok(SubmitTicket {
                    generation: self.generation,
                    payload,
                    registrar: Arc::clone(&self.registrar),
                })
            }
            Err(errors) => {
                debug!(invalid = errors.len(), "Submission blocked by validation");
                self.touched.extend(Field::REQUIRED);
                self.errors = errors.clone();
                // The inline errors replace any banner from an earlier attempt
                self.phase = SubmitPhase::Idle;
                Err(SubmitRejected::Invalid(errors))
            }
        }
    }

    /// Apply a finished submission. Returns false if the outcome was stale
    /// (the form was reset since the ticket was issued) and got discarded.
    pub fn complete_submit(&mut self, outcome: SubmitOutcome) -> bool {
        if outcome.generation != self.generation || !self.phase.is_submitting() {
            debug!(
                outcome_generation = outcome.generation,
                generation = self.generation,
                "Discarding stale submission outcome"
            );
            return false;
        }

        match outcome.result {
            Ok(()) => {
                info!("Member registered");
                self.values = MemberDraft::default();
                self.touched.clear();
                self.errors.clear();
                self.phase = SubmitPhase::Succeeded;
            }
            Err(e) => {
                error!(error = %e, "Member registration failed");
                self.phase = SubmitPhase::Failed(e.user_message().to_string());
            }
        }
        true
    }

    /// Validate, send and apply the result in one step.
    ///
    /// If the returned future is dropped before the request finishes, the
    /// form ends up `Failed` with its draft intact, ready to submit again.
    pub async fn submit(&mut self) -> Result<&SubmitPhase, SubmitRejected> {
        let ticket = self.begin_submit()?;
        let mut guard = InFlightGuard { form: &mut *self, finished: false };
        let outcome = ticket.dispatch().await;
        guard.form.complete_submit(outcome);
        guard.finished = true;
        drop(guard);
        Ok(&self.phase)
    }

    /// Discard the draft and any in-flight submission.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.values = MemberDraft::default();
        self.touched.clear();
        self.errors.clear();
        self.phase = SubmitPhase::Idle;
    }
}

/// Settles a `Submitting` form whose one-shot `submit` was abandoned mid-request.
struct InFlightGuard<'a> {
    form: &'a mut FormController,
    finished: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished && self.form.phase.is_submitting() {
            warn!("Submission cancelled before a response arrived");
            self.form.phase = SubmitPhase::Failed(NETWORK_FAILURE_MESSAGE.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use reqwest::StatusCode;

    use super::*;
    use crate::api::error::REJECTED_MESSAGE;

    /// Registrar that records what it was asked to send.
    struct FakeRegistrar {
        status: Option<StatusCode>,
        sent: Mutex<Vec<MemberPayload>>,
    }

    impl FakeRegistrar {
        fn accepting() -> Arc<Self> {
            Arc::new(Self { status: None, sent: Mutex::new(Vec::new()) })
        }

        fn failing(status: StatusCode) -> Arc<Self> {
            Arc::new(Self { status: Some(status), sent: Mutex::new(Vec::new()) })
        }

        fn sent(&self) -> Vec<MemberPayload> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MemberRegistrar for FakeRegistrar {
        fn register<'a>(&'a self, payload: &'a MemberPayload) -> BoxFuture<'a, Result<(), ApiError>> {
            self.sent.lock().unwrap().push(payload.clone());
            let result = match self.status {
                None => Ok(()),
                Some(status) => Err(ApiError::from_status(status, "rejected")),
            };
            Box::pin(async move { result })
        }
    }

    fn fill_required(form: &mut FormController) {
        form.set_field(Field::FirstName, "Kojo").unwrap();
        form.set_field(Field::LastName, "Asante").unwrap();
        form.set_field(Field::DateOfBirth, "2003-09-01").unwrap();
        form.set_field(Field::Location, "Tema").unwrap();
        form.set_field(Field::Phone, "0201234567").unwrap();
        form.set_field(Field::Occupation, "Student").unwrap();
        form.set_field(Field::Group, "2").unwrap();
    }

    #[test]
    fn test_set_field_marks_touched_and_validates() {
        let mut form = FormController::new(FakeRegistrar::accepting());
        assert!(form.touched().is_empty());

        form.set_field(Field::FirstName, "").unwrap();
        assert!(form.is_touched(Field::FirstName));
        assert_eq!(form.visible_error(Field::FirstName), Some(rules::REQUIRED_MESSAGE));

        form.set_field(Field::FirstName, "Kojo").unwrap();
        assert_eq!(form.visible_error(Field::FirstName), None);
        // Other fields are not validated by a single edit
        assert!(!form.errors().contains_key(&Field::LastName));
    }

    #[test]
    fn test_set_field_by_key() {
        let mut form = FormController::new(FakeRegistrar::accepting());
        form.set_field_by_key("occupation", "Nurse").unwrap();
        form.set_field_by_key("isLeader", true).unwrap();
        assert_eq!(form.values().occupation, "Nurse");
        assert!(form.values().is_leader);
        assert!(matches!(
            form.set_field_by_key("nickname", "x"),
            Err(FormError::UnknownField(_))
        ));
    }

    #[test]
    fn test_kind_mismatch_leaves_state_alone() {
        let mut form = FormController::new(FakeRegistrar::accepting());
        assert!(form.set_field(Field::IsVisitor, "yes").is_err());
        assert!(form.touched().is_empty());
        assert!(form.toggle(Field::Phone).is_err());
    }

    #[test]
    fn test_toggle_flag() {
        let mut form = FormController::new(FakeRegistrar::accepting());
        form.toggle(Field::IsStudent).unwrap();
        assert!(form.values().is_student);
        form.toggle(Field::IsStudent).unwrap();
        assert!(!form.values().is_student);
    }

    #[test]
    fn test_group_outside_range_is_rejected() {
        let mut form = FormController::new(FakeRegistrar::accepting());
        form.set_field(Field::Group, "7").unwrap();
        assert_eq!(form.visible_error(Field::Group), Some(rules::INVALID_GROUP_MESSAGE));
        form.set_field(Field::Group, "5").unwrap();
        assert_eq!(form.visible_error(Field::Group), None);
    }

    #[tokio::test]
    async fn test_each_missing_required_field_blocks_submit() {
        for missing in Field::REQUIRED {
            let registrar = FakeRegistrar::accepting();
            let mut form = FormController::new(registrar.clone());
            fill_required(&mut form);
            form.set_field(missing, "").unwrap();

            let err = form.submit().await.unwrap_err();
            match err {
                SubmitRejected::Invalid(errors) => {
                    assert_eq!(errors.len(), 1, "{missing}");
                    assert!(errors.contains_key(&missing));
                }
                other => panic!("unexpected rejection {other:?}"),
            }
            assert!(registrar.sent().is_empty(), "{missing} reached the network");
            assert_eq!(form.phase(), &SubmitPhase::Idle);
        }
    }

    #[tokio::test]
    async fn test_invalid_submit_touches_required_fields() {
        let mut form = FormController::new(FakeRegistrar::accepting());
        assert!(!form.can_submit());
        assert!(form.submit().await.is_err());
        for field in Field::REQUIRED {
            assert!(form.is_touched(field));
            assert_eq!(form.visible_error(field), Some(rules::REQUIRED_MESSAGE));
        }
    }

    #[tokio::test]
    async fn test_successful_submit_resets_draft() {
        let registrar = FakeRegistrar::accepting();
        let mut form = FormController::new(registrar.clone());
        fill_required(&mut form);
        assert!(form.can_submit());

        let phase = form.submit().await.unwrap();
        assert_eq!(phase, &SubmitPhase::Succeeded);
        assert_eq!(form.phase().banner(), Some(SUCCESS_MESSAGE));
        assert_eq!(form.values(), &MemberDraft::default());
        assert!(form.touched().is_empty());
        assert!(form.errors().is_empty());

        let sent = registrar.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].first_name, "Kojo");
        assert_eq!(sent[0].group, "2");
        assert_eq!(sent[0].group_id, "2");
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_draft() {
        let registrar = FakeRegistrar::failing(StatusCode::BAD_REQUEST);
        let mut form = FormController::new(registrar.clone());
        fill_required(&mut form);
        let before = form.values().clone();

        let phase = form.submit().await.unwrap().clone();
        assert_eq!(phase, SubmitPhase::Failed(REJECTED_MESSAGE.to_string()));
        assert_eq!(form.values(), &before);
        assert!(!REJECTED_MESSAGE.is_empty());
        assert_ne!(REJECTED_MESSAGE, NETWORK_FAILURE_MESSAGE);

        // Retry is a fresh single attempt
        form.submit().await.unwrap();
        assert_eq!(registrar.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_conditional_fields_in_payload() {
        let registrar = FakeRegistrar::accepting();
        let mut form = FormController::new(registrar.clone());
        fill_required(&mut form);
        form.set_field(Field::IsStudent, true).unwrap();
        form.set_field(Field::School, "KNUST").unwrap();
        form.set_field(Field::IsVisitor, true).unwrap();
        form.set_field(Field::WillReturn, true).unwrap();
        form.set_field(Field::IsStudent, false).unwrap();
        form.set_field(Field::IsVisitor, false).unwrap();

        form.submit().await.unwrap();
        let sent = registrar.sent();
        assert_eq!(sent[0].school, "");
        assert!(!sent[0].is_student);
        assert!(!sent[0].will_be_coming);
        assert!(!sent[0].is_visitor);
    }

    /// Registrar whose request never completes.
    struct HangingRegistrar;

    impl MemberRegistrar for HangingRegistrar {
        fn register<'a>(&'a self, _payload: &'a MemberPayload) -> BoxFuture<'a, Result<(), ApiError>> {
            Box::pin(futures::future::pending())
        }
    }

    #[tokio::test]
    async fn test_abandoned_submit_can_be_retried() {
        let mut form = FormController::new(Arc::new(HangingRegistrar));
        fill_required(&mut form);
        let before = form.values().clone();

        let timed_out = tokio::time::timeout(Duration::from_millis(50), form.submit())
            .await
            .is_err();
        assert!(timed_out);

        assert_eq!(
            form.phase(),
            &SubmitPhase::Failed(NETWORK_FAILURE_MESSAGE.to_string())
        );
        assert_eq!(form.values(), &before);
        assert!(form.can_submit());
        assert!(form.begin_submit().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_submit_clears_old_banner() {
        let mut form = FormController::new(FakeRegistrar::failing(StatusCode::BAD_GATEWAY));
        fill_required(&mut form);
        form.submit().await.unwrap();
        assert!(form.phase().banner().is_some());

        form.set_field(Field::Phone, " ").unwrap();
        assert!(matches!(form.submit().await, Err(SubmitRejected::Invalid(_))));
        assert_eq!(form.phase(), &SubmitPhase::Idle);
        assert_eq!(form.phase().banner(), None);
        assert_eq!(form.visible_error(Field::Phone), Some(rules::REQUIRED_MESSAGE));
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_in_flight() {
        let registrar = FakeRegistrar::accepting();
        let mut form = FormController::new(registrar.clone());
        fill_required(&mut form);

        let ticket = form.begin_submit().unwrap();
        assert!(form.phase().is_submitting());
        assert!(!form.can_submit());
        assert!(matches!(form.begin_submit(), Err(SubmitRejected::InFlight)));
        assert!(registrar.sent().is_empty());

        let outcome = ticket.dispatch().await;
        assert!(form.complete_submit(outcome));
        assert_eq!(form.phase(), &SubmitPhase::Succeeded);
        assert_eq!(registrar.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_outcome_after_reset_is_discarded() {
        let registrar = FakeRegistrar::failing(StatusCode::INTERNAL_SERVER_ERROR);
        let mut form = FormController::new(registrar);
        fill_required(&mut form);

        let ticket = form.begin_submit().unwrap();
        form.reset();
        form.set_field(Field::FirstName, "Esi").unwrap();

        let outcome = ticket.dispatch().await;
        assert!(!form.complete_submit(outcome));
        assert_eq!(form.phase(), &SubmitPhase::Idle);
        assert_eq!(form.values().first_name, "Esi");
    }

    #[tokio::test]
    async fn test_ticket_outlives_dropped_controller() {
        let registrar = FakeRegistrar::accepting();
        let mut form = FormController::new(registrar.clone());
        fill_required(&mut form);
        let ticket = form.begin_submit().unwrap();
        drop(form);

        let outcome = ticket.dispatch().await;
        assert!(outcome.result.is_ok());
        assert_eq!(registrar.sent().len(), 1);
    }
}
