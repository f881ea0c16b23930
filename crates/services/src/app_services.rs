use std::sync::Arc;

use quiz_core::SessionSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::bookmark_service::BookmarkService;
use crate::error::AppServicesError;
use crate::media::MediaGateway;
use crate::progress_service::ProgressService;
use crate::sessions::{QuizSessionService, SessionSummaryService};

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    sessions: Arc<QuizSessionService>,
    session_summaries: Arc<SessionSummaryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: SessionSettings,
        media: Arc<dyn MediaGateway>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings, media))
    }

    #[must_use]
    pub fn in_memory(
        clock: Clock,
        settings: SessionSettings,
        media: Arc<dyn MediaGateway>,
    ) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, settings, media)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        settings: SessionSettings,
        media: Arc<dyn MediaGateway>,
    ) -> Self {
        Self {
            sessions: Arc::new(QuizSessionService::new(clock, settings, storage, media)),
            session_summaries: Arc::new(SessionSummaryService::new(Arc::clone(
                &storage.session_summaries,
            ))),
        }
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<QuizSessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn session_summaries(&self) -> Arc<SessionSummaryService> {
        Arc::clone(&self.session_summaries)
    }

    #[must_use]
    pub fn progress(&self) -> ProgressService {
        self.sessions.progress().clone()
    }

    #[must_use]
    pub fn bookmarks(&self) -> BookmarkService {
        self.sessions.bookmarks().clone()
    }
}
