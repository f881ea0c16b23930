use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{CategoryKey, UserEmail};
use crate::model::score::ScoreResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many answers for a single session: {len}")]
    TooManyAnswers { len: usize },

    #[error("total answered ({total}) does not match correct + wrong ({sum})")]
    CountMismatch { total: u32, sum: u32 },

    #[error("unknown session kind: {0}")]
    UnknownKind(String),
}

/// Which builder produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Exam,
    CategoryReview,
    BookmarkReview,
    FreeQuiz,
}

impl SessionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Exam => "exam",
            SessionKind::CategoryReview => "category_review",
            SessionKind::BookmarkReview => "bookmark_review",
            SessionKind::FreeQuiz => "free_quiz",
        }
    }

    /// # Errors
    ///
    /// Returns `SessionSummaryError::UnknownKind` for unrecognized values.
    pub fn parse(raw: &str) -> Result<Self, SessionSummaryError> {
        match raw {
            "exam" => Ok(SessionKind::Exam),
            "category_review" => Ok(SessionKind::CategoryReview),
            "bookmark_review" => Ok(SessionKind::BookmarkReview),
            "free_quiz" => Ok(SessionKind::FreeQuiz),
            other => Err(SessionSummaryError::UnknownKind(other.to_string())),
        }
    }

    #[must_use]
    pub fn is_exam(self) -> bool {
        matches!(self, SessionKind::Exam)
    }
}

/// Aggregate result of a finished quiz or exam session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    user: UserEmail,
    kind: SessionKind,
    category: Option<CategoryKey>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    correct: u32,
    wrong: u32,
    timed_out: bool,
}

impl SessionSummary {
    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the time range is inverted or counts do not add up.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user: UserEmail,
        kind: SessionKind,
        category: Option<CategoryKey>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total: u32,
        correct: u32,
        wrong: u32,
        timed_out: bool,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        let sum = correct.saturating_add(wrong);
        if sum != total {
            return Err(SessionSummaryError::CountMismatch { total, sum });
        }

        Ok(Self {
            user,
            kind,
            category,
            started_at,
            completed_at,
            total,
            correct,
            wrong,
            timed_out,
        })
    }

    /// Build a summary from a scored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::TooManyAnswers` if a count cannot fit in `u32`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_score(
        user: UserEmail,
        kind: SessionKind,
        category: Option<CategoryKey>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: &ScoreResult,
        timed_out: bool,
    ) -> Result<Self, SessionSummaryError> {
        let count = |len: usize| {
            u32::try_from(len).map_err(|_| SessionSummaryError::TooManyAnswers { len })
        };
        Self::from_persisted(
            user,
            kind,
            category,
            started_at,
            completed_at,
            count(score.total_answered())?,
            count(score.correct_count())?,
            count(score.wrong_count())?,
            timed_out,
        )
    }

    #[must_use]
    pub fn user(&self) -> &UserEmail {
        &self.user
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
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
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Score percentage rounded to two decimals; `None` when nothing was answered.
    #[must_use]
    pub fn score_percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(crate::model::score::round2(
            f64::from(self.correct) * 100.0 / f64::from(self.total),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn user() -> UserEmail {
        UserEmail::new("learner@example.org").unwrap()
    }

    #[test]
    fn counts_must_add_up() {
        let now = fixed_now();
        let err = SessionSummary::from_persisted(
            user(),
            SessionKind::Exam,
            None,
            now,
            now,
            5,
            3,
            1,
            false,
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::CountMismatch { total: 5, sum: 4 });
    }

    #[test]
    fn completed_before_started_is_rejected() {
        let now = fixed_now();
        let err = SessionSummary::from_score(
            user(),
            SessionKind::FreeQuiz,
            None,
            now,
            now - chrono::Duration::seconds(1),
            &ScoreResult::default(),
            false,
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            SessionKind::Exam,
            SessionKind::CategoryReview,
            SessionKind::BookmarkReview,
            SessionKind::FreeQuiz,
        ] {
            assert_eq!(SessionKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(SessionKind::parse("bogus").is_err());
    }

    #[test]
    fn summary_score_percent() {
        let now = fixed_now();
        let summary = SessionSummary::from_persisted(
            user(),
            SessionKind::Exam,
            None,
            now,
            now,
            30,
            27,
            3,
            true,
        )
        .unwrap();
        assert_eq!(summary.score_percent(), Some(90.0));
        assert!(summary.timed_out());
    }
}
