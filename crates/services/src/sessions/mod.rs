mod builder;
mod navigator;
mod prefetch;
mod service;
mod session;
mod spec;
mod summaries;
mod timer;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use builder::{
    CatalogSnapshot, DEFAULT_EXAM_TARGET, SessionBuilder, SessionPlan, shuffle_answers,
};
pub use navigator::{
    Advance, AnswerState, CheckOutcome, EndReason, Navigator, Phase, TimerTick, TransitionRejected,
};
pub use prefetch::PrefetchDebouncer;
pub use service::QuizSessionService;
pub use session::QuizSession;
pub use spec::{ExitDestination, SessionParams, SessionSpec};
pub use summaries::{SessionSummaryId, SessionSummaryListItem, SessionSummaryService};
pub use timer::{TaskHandle, spawn_exam_countdown};
pub use view::{AnswerReview, QuestionView, SessionReport, SessionSnapshot};
