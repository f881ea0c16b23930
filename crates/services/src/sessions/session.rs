use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quiz_core::Clock;
use quiz_core::model::{
    Attempt, BookmarkToggle, CategoryKey, MediaUri, ScoreResult, SessionId, SessionKind,
    SessionSummary, UserEmail,
};
use storage::repository::SessionSummaryRepository;
use tokio::task::JoinHandle;

use super::navigator::{Advance, CheckOutcome, EndReason, Navigator, Phase, TransitionRejected};
use super::prefetch::PrefetchDebouncer;
use super::summaries::SessionSummaryId;
use super::timer::TaskHandle;
use super::view::{SessionReport, SessionSnapshot};
use crate::bookmark_service::BookmarkService;
use crate::error::SessionError;
use crate::media::MediaGateway;
use crate::progress_service::ProgressService;

/// Collaborators a running session reports to.
#[derive(Clone)]
pub(crate) struct SessionGateways {
    pub clock: Clock,
    pub progress: ProgressService,
    pub bookmarks: BookmarkService,
    pub summaries: Arc<dyn SessionSummaryRepository>,
    pub media: Arc<dyn MediaGateway>,
}

/// One live quiz or exam.
///
/// Owns the navigator, the exam countdown task, and the image prefetcher.
/// Background work is cancelled when the session ends or is dropped.
pub struct QuizSession {
    id: SessionId,
    user: UserEmail,
    category: Option<CategoryKey>,
    started_at: DateTime<Utc>,
    navigator: Arc<Mutex<Navigator>>,
    gateways: SessionGateways,
    timer: TaskHandle,
    prefetch: PrefetchDebouncer,
    pending_writes: Vec<JoinHandle<()>>,
    summary_id: Option<SessionSummaryId>,
}

impl QuizSession {
    pub(crate) fn new(
        user: UserEmail,
        category: Option<CategoryKey>,
        navigator: Arc<Mutex<Navigator>>,
        gateways: SessionGateways,
        timer: TaskHandle,
        prefetch: PrefetchDebouncer,
    ) -> Self {
        let started_at = gateways.clock.now();
        let mut session = Self {
            id: SessionId::generate(),
            user,
            category,
            started_at,
            navigator,
            gateways,
            timer,
            prefetch,
            pending_writes: Vec::new(),
            summary_id: None,
        };
        session.prefetch_current();
        session
    }

    // ─── Reads ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user(&self) -> &UserEmail {
        &self.user
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.nav().kind()
    }

    #[must_use]
    pub fn category(&self) -> Option<&CategoryKey> {
        self.category.as_ref()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.nav().phase()
    }

    #[must_use]
    pub fn summary_id(&self) -> Option<SessionSummaryId> {
        self.summary_id
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let image = self.current_image();
        SessionSnapshot::from_navigator(self.id.to_string(), &self.nav(), image.as_ref())
    }

    #[must_use]
    pub fn score(&self) -> ScoreResult {
        self.nav().score()
    }

    #[must_use]
    pub fn report(&self) -> SessionReport {
        let nav = self.nav();
        SessionReport::new(nav.kind(), nav.phase(), &nav.score())
    }

    // ─── Transitions ───────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Forwards the navigator's rejection.
    pub fn select_option(&self, value: &str) -> Result<bool, TransitionRejected> {
        self.nav().select_option(value)
    }

    /// Grade the current question. Category reviews report the attempt to
    /// the progress gateway in the background; a failed write is logged and
    /// never blocks the session.
    ///
    /// # Errors
    ///
    /// Forwards the navigator's rejection.
    pub fn check(&mut self) -> Result<CheckOutcome, TransitionRejected> {
        let outcome = self.nav().check()?;
        if outcome.record_progress {
            let attempt = Attempt {
                question: outcome.question.clone(),
                user: self.user.clone(),
                category: outcome.category.clone(),
                is_correct: outcome.is_correct,
            };
            let progress = self.gateways.progress.clone();
            self.pending_writes.retain(|task| !task.is_finished());
            self.pending_writes.push(tokio::spawn(async move {
                if let Err(err) = progress.record_attempt(&attempt).await {
                    log::warn!(
                        "failed to record progress for {}: {err}",
                        attempt.question
                    );
                }
            }));
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Forwards the navigator's rejection.
    pub fn next(&mut self) -> Result<Advance, TransitionRejected> {
        let advance = self.nav().next()?;
        self.after_advance(advance);
        Ok(advance)
    }

    /// # Errors
    ///
    /// Forwards the navigator's rejection.
    pub fn previous(&mut self) -> Result<usize, TransitionRejected> {
        let index = self.nav().previous()?;
        self.prefetch_current();
        Ok(index)
    }

    /// Record the current exam answer and move on.
    ///
    /// # Errors
    ///
    /// Forwards the navigator's rejection.
    pub fn exam_next(&mut self) -> Result<Advance, TransitionRejected> {
        let advance = self.nav().exam_next()?;
        self.after_advance(advance);
        Ok(advance)
    }

    /// Leave the session. Returns `false` if it had already finished.
    pub fn exit(&mut self) -> bool {
        let ended = self.nav().end(EndReason::Exited);
        self.stop_background();
        ended
    }

    pub fn set_reveal_all(&self, reveal: bool) {
        self.nav().set_reveal_all(reveal);
    }

    /// Flip the bookmark on the question on screen.
    ///
    /// Returns `None` when there is no current question or the write failed;
    /// failures are logged.
    pub async fn toggle_bookmark(&self) -> Option<BookmarkToggle> {
        let number = {
            let nav = self.nav();
            nav.current_question()?.number().clone()
        };
        match self.gateways.bookmarks.toggle(&number, &self.user).await {
            Ok(toggle) => Some(toggle),
            Err(err) => {
                log::warn!("failed to toggle bookmark for {number}: {err}");
                None
            }
        }
    }

    /// Wait for progress writes started by `check`.
    pub async fn flush_progress(&mut self) {
        for task in self.pending_writes.drain(..) {
            if let Err(err) = task.await {
                log::warn!("progress write task failed: {err}");
            }
        }
    }

    /// Persist the summary of an ended session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotEnded` unless the session ended,
    /// `SessionError::AlreadySaved` on a second call, and summary or storage
    /// errors otherwise.
    pub async fn finalize_summary(&mut self) -> Result<SessionSummaryId, SessionError> {
        if self.summary_id.is_some() {
            return Err(SessionError::AlreadySaved);
        }
        let (kind, phase, score) = {
            let nav = self.nav();
            (nav.kind(), nav.phase(), nav.score())
        };
        let Phase::Ended(reason) = phase else {
            return Err(SessionError::NotEnded);
        };
        self.stop_background();
        self.flush_progress().await;

        let summary = SessionSummary::from_score(
            self.user.clone(),
            kind,
            self.category.clone(),
            self.started_at,
            self.gateways.clock.now(),
            &score,
            reason == EndReason::TimedOut,
        )?;
        let id = self.gateways.summaries.append_summary(&summary).await?;
        log::info!(
            "saved {} summary {id}: {}/{} correct",
            kind.as_str(),
            summary.correct(),
            summary.total()
        );
        self.summary_id = Some(id);
        Ok(id)
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn nav(&self) -> MutexGuard<'_, Navigator> {
        self.navigator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_image(&self) -> Option<MediaUri> {
        let nav = self.nav();
        let question = nav.current_question()?;
        self.gateways.media.resolve_image_url(question.question())
    }

    fn prefetch_current(&mut self) {
        if !self.nav().phase().is_active() {
            return;
        }
        if let Some(uri) = self.current_image() {
            self.prefetch.request(uri);
        }
    }

    fn after_advance(&mut self, advance: Advance) {
        match advance {
            Advance::Moved { .. } => self.prefetch_current(),
            Advance::Ended { destination } => {
                log::debug!("session finished, leaving to {destination:?}");
                self.stop_background();
            }
        }
    }

    fn stop_background(&mut self) {
        self.timer.cancel();
        self.prefetch.cancel();
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        self.stop_background();
    }
}
