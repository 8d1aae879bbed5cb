//! Appraisal workflow and doctrine stock classification.

pub mod app_state;
pub mod appraisal;
pub mod availability;
pub mod entities;
pub mod session;

#[allow(unused_imports)]
pub use app_state::{AppState, PersistedState};
#[allow(unused_imports)]
pub use appraisal::{Appraisal, AppraisalItem};
#[allow(unused_imports)]
pub use availability::{
    count_by_availability, filter_entries, is_visible, Availability, AvailabilityCounts,
    Classified, VisibilityFlags,
};
#[allow(unused_imports)]
pub use entities::{DoctrineStockEntry, TypeId};
#[allow(unused_imports)]
pub use session::{
    dispatch, AlertSink, AppraisalSession, AppraisalTransport, Completion, CompletionOutcome,
    PendingSubmission, SubmissionError, SubmissionErrorKind, SubmissionStatus, SubmissionTicket,
    SubmitRejected,
};
