use std::sync::Arc;

use quiz_core::model::{Attempt, CategoryCompletion, ProgressRecord, UserEmail};
use storage::repository::{ProgressRepository, QuestionCatalog};

use crate::Clock;
use crate::error::GatewayError;

/// Per-question mastery tracking and category completion.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    catalog: Arc<dyn QuestionCatalog>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        catalog: Arc<dyn QuestionCatalog>,
    ) -> Self {
        Self {
            clock,
            progress,
            catalog,
        }
    }

    /// Record one graded attempt.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Storage` if the upsert fails.
    pub async fn record_attempt(&self, attempt: &Attempt) -> Result<ProgressRecord, GatewayError> {
        let record = self
            .progress
            .record_attempt(attempt, self.clock.now())
            .await?;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `GatewayError::Storage` on repository failures.
    pub async fn progress_for(
        &self,
        user: &UserEmail,
    ) -> Result<Vec<ProgressRecord>, GatewayError> {
        Ok(self.progress.get_progress(user).await?)
    }

    /// Completion per catalog category, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Storage` on repository failures.
    pub async fn category_completion(
        &self,
        user: &UserEmail,
    ) -> Result<Vec<CategoryCompletion>, GatewayError> {
        let categories = self.catalog.list_categories().await?;
        let records = self.progress.get_progress(user).await?;
        Ok(CategoryCompletion::aggregate(&categories, &records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CategoryKey, Question, QuestionNumber};
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn question(number: &str, category: &str) -> Question {
        Question::new(
            QuestionNumber::new(number).unwrap(),
            "Q",
            "",
            vec!["A".into(), "B".into()],
            vec![String::new(), String::new()],
            vec!["A".into()],
            CategoryKey::new(category).unwrap(),
            None,
        )
        .unwrap()
    }

    fn attempt(number: &str, category: &str, is_correct: bool) -> Attempt {
        Attempt {
            question: QuestionNumber::new(number).unwrap(),
            user: UserEmail::new("learner@example.org").unwrap(),
            category: CategoryKey::new(category).unwrap(),
            is_correct,
        }
    }

    async fn service() -> ProgressService {
        let repo = InMemoryRepository::new();
        for (n, c) in [("1", "GW 1"), ("2", "GW 1"), ("3", "GW 1"), ("4", "B 1")] {
            repo.upsert_question(&question(n, c)).await.unwrap();
        }
        let repo = Arc::new(repo);
        ProgressService::new(Clock::fixed(fixed_now()), repo.clone(), repo)
    }

    #[tokio::test]
    async fn repeated_attempts_increment_the_counter() {
        let svc = service().await;
        svc.record_attempt(&attempt("1", "GW 1", false)).await.unwrap();
        let record = svc.record_attempt(&attempt("1", "GW 1", true)).await.unwrap();

        assert_eq!(record.attempts, 2);
        assert!(record.last_correct);
        assert_eq!(record.updated_at, fixed_now());
    }

    #[tokio::test]
    async fn completion_aggregates_per_category() {
        let svc = service().await;
        svc.record_attempt(&attempt("1", "GW 1", true)).await.unwrap();
        svc.record_attempt(&attempt("2", "GW 1", false)).await.unwrap();

        let user = UserEmail::new("learner@example.org").unwrap();
        let completion = svc.category_completion(&user).await.unwrap();

        assert_eq!(completion.len(), 2);
        assert_eq!(completion[0].category.as_str(), "GW 1");
        assert_eq!(completion[0].total_questions, 3);
        assert_eq!(completion[0].attempted, 2);
        assert_eq!(completion[0].mastered, 1);
        assert!((completion[0].percent() - 33.33).abs() < f64::EPSILON);
        assert_eq!(completion[1].attempted, 0);
        assert!(completion[1].percent().abs() < f64::EPSILON);
    }
}
