use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::ids::{CategoryKey, QuestionNumber, UserEmail};
use crate::model::score::round2;

/// A graded attempt reported to the progress gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub question: QuestionNumber,
    pub user: UserEmail,
    pub category: CategoryKey,
    pub is_correct: bool,
}

/// Per-question mastery tracking, keyed by `(question, user)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub question: QuestionNumber,
    pub user: UserEmail,
    pub category: CategoryKey,
    pub attempts: u32,
    pub last_correct: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn first_attempt(attempt: &Attempt, at: DateTime<Utc>) -> Self {
        Self {
            question: attempt.question.clone(),
            user: attempt.user.clone(),
            category: attempt.category.clone(),
            attempts: 1,
            last_correct: attempt.is_correct,
            updated_at: at,
        }
    }

    /// Fold another attempt into this record (upsert semantics).
    pub fn apply(&mut self, attempt: &Attempt, at: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_correct = attempt.is_correct;
        self.category = attempt.category.clone();
        self.updated_at = at;
    }
}

/// Result of toggling a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookmarkToggle {
    pub bookmarked: bool,
}

/// Completion of one category for the review screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCompletion {
    pub category: CategoryKey,
    pub total_questions: usize,
    pub attempted: usize,
    pub mastered: usize,
}

impl CategoryCompletion {
    /// Aggregate progress records for every category in `catalog_counts`.
    ///
    /// Records for categories that are not in the catalog are ignored. The
    /// output follows the order of `catalog_counts`.
    #[must_use]
    pub fn aggregate(
        catalog_counts: &[(CategoryKey, usize)],
        records: &[ProgressRecord],
    ) -> Vec<Self> {
        let mut per_category: HashMap<&CategoryKey, (usize, usize)> = HashMap::new();
        for record in records {
            let entry = per_category.entry(&record.category).or_default();
            entry.0 += 1;
            if record.last_correct {
                entry.1 += 1;
            }
        }

        catalog_counts
            .iter()
            .map(|(category, total)| {
                let (attempted, mastered) =
                    per_category.get(category).copied().unwrap_or_default();
                Self {
                    category: category.clone(),
                    total_questions: *total,
                    attempted: attempted.min(*total),
                    mastered: mastered.min(*total),
                }
            })
            .collect()
    }

    /// Mastered share of the category in percent, rounded to two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        round2(self.mastered as f64 * 100.0 / self.total_questions as f64)
    }
}
