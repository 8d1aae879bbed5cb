//! Single-flight appraisal submission.
//!
//! - The session owns the draft and an explicit [`SubmissionStatus`].
//! - A submission is split into [`AppraisalSession::begin_submit`] (synchronous),
//!   [`dispatch`] (the only await point) and [`AppraisalSession::complete`], so a UI
//!   can observe the loading state while the request is outstanding.
//! - While a submission is in flight a second one is rejected.

use async_trait::async_trait;
use thiserror::Error;

use super::appraisal::Appraisal;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("appraisal request failed: {0}")]
    Transport(String),
    #[error("Request to {url} failed: Status '{reason}'")]
    Rejected {
        url: String,
        status: u16,
        reason: String,
    },
    #[error("appraisal response could not be read: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    Transport,
    MalformedResponse,
}

impl SubmissionError {
    pub fn kind(&self) -> SubmissionErrorKind {
        match self {
            SubmissionError::Transport(_) | SubmissionError::Rejected { .. } => {
                SubmissionErrorKind::Transport
            }
            SubmissionError::Decode(_) => SubmissionErrorKind::MalformedResponse,
        }
    }
}

/// Sends a draft to the appraisal backend and returns its valuation.
#[async_trait]
pub trait AppraisalTransport: Send + Sync {
    async fn post_appraisal(&self, payload: &Appraisal) -> Result<Appraisal, SubmissionError>;
}

/// Receives failures the user should be told about.
pub trait AlertSink {
    fn alert_error(&self, message: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Loading(SubmissionTicket),
    /// The valuation itself lives in the session's draft slot.
    Succeeded,
    Failed(SubmissionError),
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("an appraisal is already in progress")]
    InFlight,
}

/// A submission that has been started but not yet sent.
#[derive(Clone, Debug)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub payload: Appraisal,
}

/// The transport's answer for a [`PendingSubmission`].
#[derive(Clone, Debug)]
pub struct Completion {
    pub ticket: SubmissionTicket,
    pub result: Result<Appraisal, SubmissionError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    Replaced,
    Failed,
    /// The session moved on (reset or already completed); nothing changed.
    Stale,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppraisalSession {
    draft: Appraisal,
    status: SubmissionStatus,
    next_ticket: u64,
}

impl AppraisalSession {
    pub fn new(draft: Option<Appraisal>) -> Self {
        Self {
            draft: draft.unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Session start. A draft the user already composed is kept; otherwise the
    /// supplied one (or a fresh default) is adopted.
    pub fn initialize(&mut self, supplied: Option<Appraisal>) {
        if !self.draft.is_blank() {
            return;
        }
        if let Some(draft) = supplied {
            self.draft = draft;
        }
    }

    pub fn draft(&self) -> &Appraisal {
        &self.draft
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, SubmissionStatus::Loading(_))
    }

    pub fn submit_done(&self) -> bool {
        matches!(self.status, SubmissionStatus::Succeeded)
    }

    pub fn last_error(&self) -> Option<&SubmissionError> {
        match &self.status {
            SubmissionStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.draft.raw = Some(raw.into());
    }

    /// Drops the draft and detaches any outstanding request from this session.
    pub fn reset(&mut self) {
        if let SubmissionStatus::Loading(ticket) = self.status {
            tracing::debug!(ticket = ticket.0, "discarding in-flight appraisal on reset");
        }
        self.draft = Appraisal::default();
        self.status = SubmissionStatus::Idle;
    }

    /// Marks the session as loading and snapshots the draft for sending.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitRejected> {
        if self.is_loading() {
            return Err(SubmitRejected::InFlight);
        }
        self.next_ticket += 1;
        let ticket = SubmissionTicket(self.next_ticket);
        self.status = SubmissionStatus::Loading(ticket);
        tracing::info!(
            ticket = ticket.0,
            lines = self.draft.input_lines().count(),
            "submitting appraisal"
        );
        Ok(PendingSubmission {
            ticket,
            payload: self.draft.clone(),
        })
    }

    /// Applies a transport answer. Success replaces the draft wholesale; failure
    /// keeps it and is reported to `alerts`. Either way the session stops loading.
    pub fn complete(&mut self, completion: Completion, alerts: &dyn AlertSink) -> CompletionOutcome {
        let Completion { ticket, result } = completion;
        if self.status != SubmissionStatus::Loading(ticket) {
            tracing::debug!(ticket = ticket.0, "ignoring stale appraisal completion");
            return CompletionOutcome::Stale;
        }

        match result {
            Ok(appraisal) => {
                tracing::info!(
                    ticket = ticket.0,
                    items = appraisal.item_count(),
                    "appraisal completed"
                );
                self.draft = appraisal;
                self.status = SubmissionStatus::Succeeded;
                CompletionOutcome::Replaced
            }
            Err(err) => {
                tracing::warn!(ticket = ticket.0, error = %err, "appraisal failed");
                alerts.alert_error(&err.to_string());
                self.status = SubmissionStatus::Failed(err);
                CompletionOutcome::Failed
            }
        }
    }

    /// Runs a whole submission for callers that can hold the session across the await.
    pub async fn submit(
        &mut self,
        transport: &dyn AppraisalTransport,
        alerts: &dyn AlertSink,
    ) -> Result<CompletionOutcome, SubmitRejected> {
        let pending = self.begin_submit()?;
        let completion = dispatch(transport, pending).await;
        Ok(self.complete(completion, alerts))
    }
}

pub async fn dispatch(transport: &dyn AppraisalTransport, pending: PendingSubmission) -> Completion {
    let PendingSubmission { ticket, payload } = pending;
    let result = transport.post_appraisal(&payload).await;
    Completion { ticket, result }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::appraisal::AppraisalItem;

    struct FixedTransport(Result<Appraisal, SubmissionError>);

    #[async_trait]
    impl AppraisalTransport for FixedTransport {
        async fn post_appraisal(&self, _payload: &Appraisal) -> Result<Appraisal, SubmissionError> {
            self.0.clone()
        }
    }

    /// Echoes the payload it was sent, with a valuation attached.
    struct EchoTransport {
        seen: Mutex<Vec<Appraisal>>,
    }

    #[async_trait]
    impl AppraisalTransport for EchoTransport {
        async fn post_appraisal(&self, payload: &Appraisal) -> Result<Appraisal, SubmissionError> {
            self.seen.lock().unwrap().push(payload.clone());
            Ok(Appraisal {
                buyback_price: Some(1.0),
                ..payload.clone()
            })
        }
    }

    #[derive(Default)]
    struct RecordingAlerts(Mutex<Vec<String>>);

    impl AlertSink for RecordingAlerts {
        fn alert_error(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    impl RecordingAlerts {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn valuation() -> Appraisal {
        Appraisal {
            link: Some("https://evepraisal.com/a/xyz".into()),
            buyback_price: Some(900.0),
            items: vec![AppraisalItem {
                type_id: Some(34),
                type_name: "Tritanium".into(),
                quantity: 200,
                jita_buy_per_unit: 5.0,
                rate: Some(0.9),
                ..AppraisalItem::default()
            }],
            ..Appraisal::default()
        }
    }

    #[test]
    fn new_session_holds_default_draft() {
        let session = AppraisalSession::new(None);
        assert_eq!(session.draft(), &Appraisal::default());
        assert_eq!(session.status(), &SubmissionStatus::Idle);
        assert!(!session.is_loading());
        assert!(!session.submit_done());
    }

    #[test]
    fn initialize_keeps_composed_draft() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 100")));
        session.initialize(None);
        assert_eq!(session.draft().raw_text(), "Tritanium 100");

        session.initialize(Some(Appraisal::from_raw("Pyerite 5")));
        assert_eq!(session.draft().raw_text(), "Tritanium 100");
    }

    #[test]
    fn initialize_adopts_supplied_draft_when_blank() {
        let mut session = AppraisalSession::new(None);
        session.initialize(None);
        assert!(session.draft().is_blank());

        session.initialize(Some(Appraisal::from_raw("Pyerite 5")));
        assert_eq!(session.draft().raw_text(), "Pyerite 5");
    }

    #[test]
    fn initialize_keeps_a_draft_holding_only_a_backend_total() {
        let valued = Appraisal {
            buyback_price: Some(450.0),
            ..Appraisal::default()
        };
        let mut session = AppraisalSession::new(Some(valued.clone()));

        session.initialize(Some(Appraisal::from_raw("Pyerite 5")));
        assert_eq!(session.draft(), &valued);
    }

    #[test]
    fn begin_submit_sets_loading_before_resolution() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 200")));
        let pending = session.begin_submit().expect("idle session accepts submit");

        assert!(session.is_loading());
        assert!(!session.submit_done());
        assert_eq!(pending.payload.raw_text(), "Tritanium 200");
    }

    #[tokio::test]
    async fn success_replaces_draft_wholesale() {
        let mut draft = Appraisal::from_raw("Tritanium 200");
        draft
            .extra
            .insert("clientNote".into(), serde_json::Value::from("keep me?"));
        let mut session = AppraisalSession::new(Some(draft));
        let alerts = RecordingAlerts::default();
        let transport = FixedTransport(Ok(valuation()));

        let pending = session.begin_submit().expect("submit starts");
        assert!(session.is_loading());
        let completion = dispatch(&transport, pending).await;
        let outcome = session.complete(completion, &alerts);

        assert_eq!(outcome, CompletionOutcome::Replaced);
        assert_eq!(session.draft(), &valuation());
        assert!(session.draft().raw.is_none());
        assert!(session.draft().extra.is_empty());
        assert!(!session.is_loading());
        assert!(session.submit_done());
        assert!(alerts.messages().is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_draft_and_stops_loading() {
        let draft = Appraisal::from_raw("Tritanium 200");
        let mut session = AppraisalSession::new(Some(draft.clone()));
        let alerts = RecordingAlerts::default();
        let transport = FixedTransport(Err(SubmissionError::Transport(
            "connection refused".into(),
        )));

        let outcome = session.submit(&transport, &alerts).await.expect("not rejected");

        assert_eq!(outcome, CompletionOutcome::Failed);
        assert_eq!(session.draft(), &draft);
        assert!(!session.is_loading());
        assert!(!session.submit_done());
        assert_eq!(
            session.last_error().map(SubmissionError::kind),
            Some(SubmissionErrorKind::Transport)
        );
        assert_eq!(
            alerts.messages(),
            vec!["appraisal request failed: connection refused".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_response_is_a_submission_failure() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 1")));
        let alerts = RecordingAlerts::default();
        let transport = FixedTransport(Err(SubmissionError::Decode("expected value".into())));

        session.submit(&transport, &alerts).await.expect("not rejected");

        assert!(matches!(session.status(), SubmissionStatus::Failed(_)));
        assert_eq!(
            session.last_error().map(SubmissionError::kind),
            Some(SubmissionErrorKind::MalformedResponse)
        );
        assert_eq!(alerts.messages().len(), 1);
    }

    #[test]
    fn second_submit_rejected_while_in_flight() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 1")));
        let first = session.begin_submit().expect("first submit starts");

        assert_eq!(session.begin_submit().unwrap_err(), SubmitRejected::InFlight);
        assert_eq!(session.status(), &SubmissionStatus::Loading(first.ticket));
    }

    #[tokio::test]
    async fn resubmit_after_failure_sends_the_surviving_draft() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 7")));
        let alerts = RecordingAlerts::default();

        let failing = FixedTransport(Err(SubmissionError::Transport("timeout".into())));
        session.submit(&failing, &alerts).await.expect("not rejected");

        let echo = EchoTransport {
            seen: Mutex::new(Vec::new()),
        };
        let outcome = session.submit(&echo, &alerts).await.expect("not rejected");

        assert_eq!(outcome, CompletionOutcome::Replaced);
        assert_eq!(echo.seen.lock().unwrap()[0].raw_text(), "Tritanium 7");
        assert_eq!(session.draft().buyback_price, Some(1.0));
    }

    #[tokio::test]
    async fn completion_after_reset_is_ignored() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 1")));
        let alerts = RecordingAlerts::default();
        let (tx, rx) = tokio::sync::oneshot::channel::<Result<Appraisal, SubmissionError>>();

        let pending = session.begin_submit().expect("submit starts");
        let ticket = pending.ticket;
        session.reset();
        assert!(!session.is_loading());

        tx.send(Ok(valuation())).expect("receiver alive");
        let result = rx.await.expect("sender sent");
        let outcome = session.complete(Completion { ticket, result }, &alerts);

        assert_eq!(outcome, CompletionOutcome::Stale);
        assert!(session.draft().is_blank());
        assert_eq!(session.status(), &SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn a_completion_only_applies_once() {
        let mut session = AppraisalSession::new(Some(Appraisal::from_raw("Tritanium 1")));
        let alerts = RecordingAlerts::default();
        let transport = FixedTransport(Ok(valuation()));

        let pending = session.begin_submit().expect("submit starts");
        let completion = dispatch(&transport, pending).await;
        assert_eq!(
            session.complete(completion.clone(), &alerts),
            CompletionOutcome::Replaced
        );
        assert_eq!(
            session.complete(completion, &alerts),
            CompletionOutcome::Stale
        );
    }
}
