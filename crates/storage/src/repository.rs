use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    Attempt, BookmarkToggle, CategoryKey, ProgressRecord, Question, QuestionNumber,
    SessionSummary, UserEmail,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted session summary together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub summary: SessionSummary,
}

impl SessionSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: SessionSummary) -> Self {
        Self { id, summary }
    }
}

/// Read side of the question corpus, plus the import hook used by seeding.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// Insert or replace a question, keeping its catalog position on replace.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Every question in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_all(&self) -> Result<Vec<Question>, StorageError>;

    /// Questions whose category matches `category` exactly, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_by_category(&self, category: &CategoryKey)
    -> Result<Vec<Question>, StorageError>;

    /// Fetch questions by number, in the order requested.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if any are missing, or other storage errors.
    async fn get_questions(&self, numbers: &[QuestionNumber])
    -> Result<Vec<Question>, StorageError>;

    /// Categories with their question counts, in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_categories(&self) -> Result<Vec<(CategoryKey, usize)>, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Upsert progress keyed by `(question, user)`, incrementing the attempt counter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for questions outside the catalog, or
    /// other storage errors.
    async fn record_attempt(
        &self,
        attempt: &Attempt,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError>;

    /// All progress records of a user, ordered by question number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_progress(&self, user: &UserEmail) -> Result<Vec<ProgressRecord>, StorageError>;
}

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Flip the bookmark of `question` for `user`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question is not in the catalog.
    async fn toggle_bookmark(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<BookmarkToggle, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn is_bookmarked(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<bool, StorageError>;

    /// Bookmarked questions of a user in the order they were bookmarked.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_bookmarks(&self, user: &UserEmail) -> Result<Vec<Question>, StorageError>;
}

#[async_trait]
pub trait SessionSummaryRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no summary has this id.
    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError>;

    /// Most recent summaries of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_summaries(
        &self,
        user: &UserEmail,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<Question>>>,
    progress: Arc<Mutex<HashMap<(QuestionNumber, UserEmail), ProgressRecord>>>,
    bookmarks: Arc<Mutex<HashMap<UserEmail, Vec<QuestionNumber>>>>,
    summaries: Arc<Mutex<Vec<SessionSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl QuestionCatalog for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = lock(&self.questions)?;
        match guard.iter_mut().find(|q| q.number() == question.number()) {
            Some(existing) => *existing = question.clone(),
            None => guard.push(question.clone()),
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Question>, StorageError> {
        Ok(lock(&self.questions)?.clone())
    }

    async fn list_by_category(
        &self,
        category: &CategoryKey,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = lock(&self.questions)?;
        Ok(guard
            .iter()
            .filter(|q| q.category() == category)
            .cloned()
            .collect())
    }

    async fn get_questions(
        &self,
        numbers: &[QuestionNumber],
    ) -> Result<Vec<Question>, StorageError> {
        let guard = lock(&self.questions)?;
        let mut found = Vec::with_capacity(numbers.len());
        for number in numbers {
            match guard.iter().find(|q| q.number() == number) {
                Some(question) => found.push(question.clone()),
                None => return Err(StorageError::NotFound),
            }
        }
        Ok(found)
    }

    async fn list_categories(&self) -> Result<Vec<(CategoryKey, usize)>, StorageError> {
        let guard = lock(&self.questions)?;
        let mut out: Vec<(CategoryKey, usize)> = Vec::new();
        for question in guard.iter() {
            match out.iter_mut().find(|(key, _)| key == question.category()) {
                Some((_, count)) => *count += 1,
                None => out.push((question.category().clone(), 1)),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn record_attempt(
        &self,
        attempt: &Attempt,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        if !lock(&self.questions)?
            .iter()
            .any(|q| q.number() == &attempt.question)
        {
            return Err(StorageError::NotFound);
        }

        let mut guard = lock(&self.progress)?;
        let key = (attempt.question.clone(), attempt.user.clone());
        let record = guard
            .entry(key)
            .and_modify(|record| record.apply(attempt, at))
            .or_insert_with(|| ProgressRecord::first_attempt(attempt, at));
        Ok(record.clone())
    }

    async fn get_progress(&self, user: &UserEmail) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = lock(&self.progress)?;
        let mut records: Vec<ProgressRecord> = guard
            .values()
            .filter(|r| &r.user == user)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.question.cmp(&b.question));
        Ok(records)
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryRepository {
    async fn toggle_bookmark(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<BookmarkToggle, StorageError> {
        if !lock(&self.questions)?
            .iter()
            .any(|q| q.number() == question)
        {
            return Err(StorageError::NotFound);
        }

        let mut guard = lock(&self.bookmarks)?;
        let list = guard.entry(user.clone()).or_default();
        if let Some(pos) = list.iter().position(|n| n == question) {
            list.remove(pos);
            Ok(BookmarkToggle { bookmarked: false })
        } else {
            list.push(question.clone());
            Ok(BookmarkToggle { bookmarked: true })
        }
    }

    async fn is_bookmarked(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<bool, StorageError> {
        let guard = lock(&self.bookmarks)?;
        Ok(guard
            .get(user)
            .is_some_and(|list| list.iter().any(|n| n == question)))
    }

    async fn list_bookmarks(&self, user: &UserEmail) -> Result<Vec<Question>, StorageError> {
        let numbers = lock(&self.bookmarks)?
            .get(user)
            .cloned()
            .unwrap_or_default();
        let questions = lock(&self.questions)?;
        Ok(numbers
            .iter()
            .filter_map(|n| questions.iter().find(|q| q.number() == n).cloned())
            .collect())
    }
}

#[async_trait]
impl SessionSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let mut guard = lock(&self.summaries)?;
        guard.push(summary.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("id overflow".into()))
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let guard = lock(&self.summaries)?;
        usize::try_from(id)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| guard.get(i))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_summaries(
        &self,
        user: &UserEmail,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let guard = lock(&self.summaries)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        for (index, summary) in guard.iter().enumerate().rev() {
            if rows.len() >= limit {
                break;
            }
            if summary.user() == user {
                let id = i64::try_from(index + 1)
                    .map_err(|_| StorageError::Serialization("id overflow".into()))?;
                rows.push(SessionSummaryRow::new(id, summary.clone()));
            }
        }
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn QuestionCatalog>,
    pub progress: Arc<dyn ProgressRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub session_summaries: Arc<dyn SessionSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            catalog: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            bookmarks: Arc::new(repo.clone()),
            session_summaries: Arc::new(repo),
        }
    }
}
