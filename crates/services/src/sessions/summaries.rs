use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::{CategoryKey, SessionKind, SessionSummary, UserEmail};
use storage::repository::SessionSummaryRepository;

use crate::error::SessionError;

/// Storage identifier for a persisted session summary.
pub type SessionSummaryId = i64;

/// Presentation-agnostic list item for a finished session.
///
/// Timestamps are left unformatted; the caller picks locale and style.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummaryListItem {
    pub id: SessionSummaryId,
    pub kind: SessionKind,
    pub category: Option<CategoryKey>,
    pub completed_at: DateTime<Utc>,

    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub score_percent: Option<f64>,
    pub timed_out: bool,
}

impl SessionSummaryListItem {
    #[must_use]
    pub fn from_summary(id: SessionSummaryId, summary: &SessionSummary) -> Self {
        Self {
            id,
            kind: summary.kind(),
            category: summary.category().cloned(),
            completed_at: summary.completed_at(),
            total: summary.total(),
            correct: summary.correct(),
            wrong: summary.wrong(),
            score_percent: summary.score_percent(),
            timed_out: summary.timed_out(),
        }
    }
}

/// Read side of persisted session summaries.
#[derive(Clone)]
pub struct SessionSummaryService {
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl SessionSummaryService {
    #[must_use]
    pub fn new(summaries: Arc<dyn SessionSummaryRepository>) -> Self {
        Self { summaries }
    }

    /// Most recent summaries for `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        user: &UserEmail,
        limit: u32,
    ) -> Result<Vec<SessionSummaryListItem>, SessionError> {
        let rows = self.summaries.list_summaries(user, limit).await?;
        Ok(rows
            .iter()
            .map(|row| SessionSummaryListItem::from_summary(row.id, &row.summary))
            .collect())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the summary does not exist or the read fails.
    pub async fn get_summary(&self, id: SessionSummaryId) -> Result<SessionSummary, SessionError> {
        Ok(self.summaries.get_summary(id).await?)
    }
}
