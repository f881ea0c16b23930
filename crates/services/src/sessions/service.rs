use std::sync::{Arc, Mutex};

use rand::Rng;

use quiz_core::model::UserEmail;
use quiz_core::{Clock, SessionSettings};
use storage::repository::{QuestionCatalog, SessionSummaryRepository, Storage};

use super::builder::{CatalogSnapshot, SessionBuilder, SessionPlan};
use super::navigator::Navigator;
use super::prefetch::PrefetchDebouncer;
use super::session::{QuizSession, SessionGateways};
use super::spec::{SessionParams, SessionSpec};
use super::timer::{TaskHandle, spawn_exam_countdown};
use crate::bookmark_service::BookmarkService;
use crate::media::MediaGateway;
use crate::progress_service::ProgressService;

/// Starts quiz and exam sessions against the catalog.
///
/// Catalog failures never abort a start: the session comes up empty and the
/// failure is logged.
#[derive(Clone)]
pub struct QuizSessionService {
    settings: SessionSettings,
    catalog: Arc<dyn QuestionCatalog>,
    gateways: SessionGateways,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: SessionSettings,
        storage: &Storage,
        media: Arc<dyn MediaGateway>,
    ) -> Self {
        let catalog = Arc::clone(&storage.catalog);
        Self {
            settings,
            gateways: SessionGateways {
                clock,
                progress: ProgressService::new(
                    clock,
                    Arc::clone(&storage.progress),
                    Arc::clone(&catalog),
                ),
                bookmarks: BookmarkService::new(Arc::clone(&storage.bookmarks)),
                summaries: Arc::clone(&storage.session_summaries),
                media,
            },
            catalog,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.gateways.progress
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BookmarkService {
        &self.gateways.bookmarks
    }

    #[must_use]
    pub fn summaries(&self) -> Arc<dyn SessionSummaryRepository> {
        Arc::clone(&self.gateways.summaries)
    }

    /// Resolve `params` and start a session with thread-local randomness.
    pub async fn start(&self, user: UserEmail, params: SessionParams) -> QuizSession {
        let spec = params.resolve();
        let snapshot = self.load_snapshot(&spec).await;
        let plan = self.plan(&snapshot, &spec, &mut rand::rng());
        self.launch(user, &spec, plan)
    }

    /// Start a session drawing from `rng`; used for reproducible sessions.
    pub async fn start_with_rng<R: Rng + Send + ?Sized>(
        &self,
        user: UserEmail,
        spec: SessionSpec,
        rng: &mut R,
    ) -> QuizSession {
        let snapshot = self.load_snapshot(&spec).await;
        let plan = self.plan(&snapshot, &spec, rng);
        self.launch(user, &spec, plan)
    }

    /// Review the learner's bookmarks, oldest bookmark first.
    pub async fn start_bookmark_review(&self, user: UserEmail) -> QuizSession {
        let questions = match self.gateways.bookmarks.list(&user).await {
            Ok(questions) => questions,
            Err(err) => {
                log::warn!("failed to load bookmarks for {user}: {err}");
                Vec::new()
            }
        };
        self.start(user, SessionParams::bookmarks(questions)).await
    }

    async fn load_snapshot(&self, spec: &SessionSpec) -> CatalogSnapshot {
        let loaded = match spec {
            SessionSpec::CategoryReview { category } => {
                self.catalog.list_by_category(category).await
            }
            SessionSpec::BookmarkReview { .. } => Ok(Vec::new()),
            SessionSpec::Exam { .. } | SessionSpec::FreeQuiz => self.catalog.list_all().await,
        };
        match loaded {
            Ok(questions) => CatalogSnapshot::new(questions),
            Err(err) => {
                log::warn!("question catalog unavailable: {err}");
                CatalogSnapshot::default()
            }
        }
    }

    fn plan<R: Rng + ?Sized>(
        &self,
        snapshot: &CatalogSnapshot,
        spec: &SessionSpec,
        rng: &mut R,
    ) -> SessionPlan {
        SessionBuilder::new(snapshot)
            .with_exam_target(self.settings.exam_target_size())
            .build(spec, rng)
    }

    fn launch(&self, user: UserEmail, spec: &SessionSpec, plan: SessionPlan) -> QuizSession {
        log::info!(
            "starting {} session with {} questions ({} category picks, {} fill)",
            plan.kind.as_str(),
            plan.total(),
            plan.category_picks,
            plan.fill_picks
        );
        let mut navigator = Navigator::new(plan.kind, plan.questions, &self.settings);
        let phase = navigator.begin();
        let navigator = Arc::new(Mutex::new(navigator));

        let timer = if plan.kind.is_exam() && phase.is_active() {
            spawn_exam_countdown(Arc::clone(&navigator), self.settings.tick_interval())
        } else {
            TaskHandle::default()
        };
        let prefetch = PrefetchDebouncer::new(
            Arc::clone(&self.gateways.media),
            self.settings.prefetch_debounce(),
        );

        QuizSession::new(
            user,
            spec.category().cloned(),
            navigator,
            self.gateways.clone(),
            timer,
            prefetch,
        )
    }
}
