use tracing::{debug, error, warn};

use super::form::{Field, FormErrors, FormSnapshot, FormState};
use super::gate::evaluate;
use super::transport::{LeadTransport, TransportError};
use super::validate::DETAILS_MAX_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast shown after a submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub description: &'static str,
}

impl Notice {
    const INVALID: Notice = Notice {
        level: NoticeLevel::Error,
        title: "Form Hatası",
        description: "Lütfen formdaki hataları düzeltin.",
    };
    const SEND_FAILED: Notice = Notice {
        level: NoticeLevel::Error,
        title: "Hata",
        description: "Form gönderilirken bir hata oluştu. Lütfen tekrar deneyin.",
    };
    const UNEXPECTED: Notice = Notice {
        level: NoticeLevel::Error,
        title: "Hata",
        description: "Beklenmeyen bir hata oluştu. Lütfen tekrar deneyin.",
    };
    const RECEIVED: Notice = Notice {
        level: NoticeLevel::Success,
        title: "Talebiniz Alındı",
        description: "Aynı gün içinde sizinle iletişime geçeceğiz.",
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Invalid(FormErrors),
    Failed(TransportError),
    /// Submit while a request is in flight or after confirmation
    Ignored,
}

/// Everything the page needs to draw the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub values: FormSnapshot,
    /// Inline messages in field order; the honeypot never shows one
    pub errors: Vec<(Field, &'static str)>,
    pub phase: Phase,
    pub submitting: bool,
    pub submitted: bool,
    pub submit_enabled: bool,
    pub notice: Option<Notice>,
}

impl FormView {
    /// Blank form in its initial state
    pub fn empty() -> Self {
        Self::build(&FormState::new(), Phase::Editing, None)
    }

    fn build(state: &FormState, phase: Phase, notice: Option<Notice>) -> Self {
        let values = state.snapshot();
        let errors = state
            .errors()
            .iter()
            .filter(|e| e.field != Field::Honeypot)
            .map(|e| (e.field, e.message()))
            .collect();
        let submitting = phase == Phase::Submitting;

        Self {
            submit_enabled: !submitting && values.honeypot.is_empty(),
            values,
            errors,
            phase,
            submitting,
            submitted: phase == Phase::Submitted,
            notice,
        }
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| *msg)
    }

    /// Character counter under the details box
    pub fn details_counter(&self) -> String {
        format!(
            "{}/{} karakter",
            self.values.details.chars().count(),
            DETAILS_MAX_CHARS
        )
    }
}

type Observer = Box<dyn Fn(&FormView) + Send + Sync>;

/// Contact form controller: owns the form state and drives it through
/// `Editing -> Submitting -> Submitted`.
///
/// Every failure lands back in `Editing` with the typed values intact.
/// `Submitted` only ends through [`ContactForm::new_request`].
pub struct ContactForm<T> {
    transport: T,
    state: FormState,
    phase: Phase,
    notice: Option<Notice>,
    observers: Vec<Observer>,
}

impl<T: LeadTransport> ContactForm<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: FormState::new(),
            phase: Phase::Editing,
            notice: None,
            observers: Vec::new(),
        }
    }

    /// Register a callback run after every state change
    pub fn on_change<F>(&mut self, observer: F)
    where
        F: Fn(&FormView) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn view(&self) -> FormView {
        FormView::build(&self.state, self.phase, self.notice)
    }

    /// Input event. Inputs are disabled outside `Editing`.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        if self.phase != Phase::Editing {
            debug!(%field, phase = ?self.phase, "ignoring edit");
            return;
        }
        self.state.set_field(field, value);
        self.notify();
    }

    pub fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.notify();
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.phase != Phase::Editing {
            debug!(phase = ?self.phase, "ignoring submit");
            return SubmitOutcome::Ignored;
        }

        let lead = match evaluate(&self.state.snapshot()) {
            Ok(lead) => lead,
            Err(errors) => {
                if errors.contains(Field::Honeypot) {
                    warn!("contact form honeypot filled, submission blocked");
                }
                self.state.set_errors(errors.clone());
                self.notice = Some(Notice::INVALID);
                self.notify();
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.state.set_errors(FormErrors::new());
        self.phase = Phase::Submitting;
        self.notice = None;
        self.notify();

        let result = self.transport.submit(&lead).await;

        let outcome = match result {
            Ok(()) => {
                self.phase = Phase::Submitted;
                self.notice = Some(Notice::RECEIVED);
                SubmitOutcome::Submitted
            }
            Err(err) => {
                self.notice = Some(match &err {
                    TransportError::Unexpected(_) => {
                        error!(error = %err, "unexpected error while sending contact form");
                        Notice::UNEXPECTED
                    }
                    _ => {
                        error!(error = %err, "form submission error");
                        Notice::SEND_FAILED
                    }
                });
                self.phase = Phase::Editing;
                SubmitOutcome::Failed(err)
            }
        };
        self.notify();
        outcome
    }

    /// "Yeni Talep Oluştur": blank form, back to `Editing`
    pub fn new_request(&mut self) {
        if self.phase == Phase::Submitting {
            debug!("ignoring reset while submitting");
            return;
        }
        self.state.reset();
        self.phase = Phase::Editing;
        self.notice = None;
        self.notify();
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let view = self.view();
        for observer in &self.observers {
            observer(&view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::gate::LeadSubmission;
    use super::*;
    use crate::types::RenovationType;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Records every lead and answers with a scripted result
    #[derive(Default)]
    struct StubTransport {
        fail_with: Mutex<Option<TransportError>>,
        sent: Mutex<Vec<LeadSubmission>>,
    }

    impl StubTransport {
        fn failing(err: TransportError) -> Self {
            Self {
                fail_with: Mutex::new(Some(err)),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<LeadSubmission> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LeadTransport for StubTransport {
        async fn submit(&self, lead: &LeadSubmission) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(lead.clone());
            match self.fail_with.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn fill_valid<T: LeadTransport>(form: &mut ContactForm<T>) {
        form.set_field(Field::Name, "Ali Veli");
        form.set_field(Field::Phone, "0532 123 45 67");
        form.set_field(Field::District, "Bornova");
        form.set_field(Field::RenovationType, "mutfak");
        form.set_field(Field::Details, "Mutfak yenilemek istiyorum");
    }

    #[tokio::test]
    async fn test_successful_submit_reaches_submitted() {
        let mut form = ContactForm::new(StubTransport::default());
        fill_valid(&mut form);

        let outcome = form.submit().await;

        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert_eq!(form.phase(), Phase::Submitted);
        let view = form.view();
        assert!(view.submitted);
        assert_eq!(view.notice.map(|n| n.level), Some(NoticeLevel::Success));

        let sent = form.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].renovation_type, RenovationType::Kitchen);
    }

    #[tokio::test]
    async fn test_new_request_after_submit_blanks_form() {
        let mut form = ContactForm::new(StubTransport::default());
        fill_valid(&mut form);
        form.submit().await;

        form.new_request();

        assert_eq!(form.phase(), Phase::Editing);
        assert_eq!(form.view(), FormView::empty());
    }

    #[tokio::test]
    async fn test_submitted_is_terminal_until_new_request() {
        let mut form = ContactForm::new(StubTransport::default());
        fill_valid(&mut form);
        form.submit().await;

        form.set_field(Field::Name, "Başka Biri");
        assert_eq!(form.submit().await, SubmitOutcome::Ignored);
        assert_eq!(form.state().value(Field::Name), "Ali Veli");
        assert_eq!(form.transport().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_values() {
        let transport = StubTransport::failing(TransportError::Network("timed out".into()));
        let mut form = ContactForm::new(transport);
        fill_valid(&mut form);
        let before = form.state().snapshot();

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(TransportError::Network(_))));
        assert_eq!(form.phase(), Phase::Editing);
        assert_eq!(form.state().snapshot(), before);
        let notice = form.view().notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.description.contains("Form gönderilirken"));

        // A manual resubmit goes through
        assert_eq!(form.submit().await, SubmitOutcome::Submitted);
        assert_eq!(form.transport().sent().len(), 2);
    }

    #[tokio::test]
    async fn test_unexpected_failure_uses_generic_notice() {
        let transport = StubTransport::failing(TransportError::Unexpected("boom".into()));
        let mut form = ContactForm::new(transport);
        fill_valid(&mut form);

        form.submit().await;

        let notice = form.view().notice.unwrap();
        assert!(notice.description.starts_with("Beklenmeyen"));
        assert_eq!(form.phase(), Phase::Editing);
    }

    #[tokio::test]
    async fn test_invalid_form_never_calls_transport() {
        let mut form = ContactForm::new(StubTransport::default());
        form.set_field(Field::Phone, "123");

        let outcome = form.submit().await;

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 5);
        assert!(form.transport().sent().is_empty());
        let view = form.view();
        assert_eq!(
            view.error(Field::Phone),
            Some("Geçerli bir Türkiye telefon numarası giriniz (10-11 haneli)")
        );
        assert_eq!(view.notice.map(|n| n.title), Some("Form Hatası"));
    }

    #[tokio::test]
    async fn test_honeypot_blocks_silently() {
        let mut form = ContactForm::new(StubTransport::default());
        fill_valid(&mut form);
        form.set_field(Field::Honeypot, "http://spam.example");

        assert!(!form.view().submit_enabled);
        let outcome = form.submit().await;

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected spam block");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::Honeypot));
        assert!(form.transport().sent().is_empty());
        // Nothing field-level is shown for the hidden input
        assert!(form.view().errors.is_empty());
    }

    #[tokio::test]
    async fn test_edit_clears_field_error_without_revalidating() {
        let mut form = ContactForm::new(StubTransport::default());
        form.submit().await;
        assert!(form.view().error(Field::Name).is_some());

        form.set_field(Field::Name, " ");

        assert_eq!(form.view().error(Field::Name), None);
        assert!(form.view().error(Field::Phone).is_some());
    }

    #[tokio::test]
    async fn test_observers_see_each_transition() {
        let phases = Arc::new(Mutex::new(Vec::new()));
        let mut form = ContactForm::new(StubTransport::default());
        fill_valid(&mut form);

        let seen = Arc::clone(&phases);
        form.on_change(move |view| seen.lock().unwrap().push(view.phase));
        form.submit().await;

        assert_eq!(
            *phases.lock().unwrap(),
            vec![Phase::Submitting, Phase::Submitted]
        );
    }

    #[test]
    fn test_details_counter() {
        let mut state = FormState::new();
        state.set_field(Field::Details, "çok güzel");
        let view = FormView::build(&state, Phase::Editing, None);
        assert_eq!(view.details_counter(), "9/800 karakter");
    }
}
