use std::sync::Arc;

use quiz_core::model::{BookmarkToggle, Question, QuestionNumber, UserEmail};
use storage::repository::BookmarkRepository;

use crate::error::GatewayError;

#[derive(Clone)]
pub struct BookmarkService {
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl BookmarkService {
    #[must_use]
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>) -> Self {
        Self { bookmarks }
    }

    /// # Errors
    ///
    /// Returns `GatewayError::Storage` if the question is unknown or the write fails.
    pub async fn toggle(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<BookmarkToggle, GatewayError> {
        Ok(self.bookmarks.toggle_bookmark(question, user).await?)
    }

    /// # Errors
    ///
    /// Returns `GatewayError::Storage` on repository failures.
    pub async fn is_bookmarked(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<bool, GatewayError> {
        Ok(self.bookmarks.is_bookmarked(question, user).await?)
    }

    /// Bookmarked questions, oldest bookmark first.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Storage` on repository failures.
    pub async fn list(&self, user: &UserEmail) -> Result<Vec<Question>, GatewayError> {
        Ok(self.bookmarks.list_bookmarks(user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::CategoryKey;
    use storage::repository::{InMemoryRepository, QuestionCatalog};

    #[tokio::test]
    async fn toggle_flips_and_lists() {
        let repo = InMemoryRepository::new();
        let question = Question::new(
            QuestionNumber::new("7").unwrap(),
            "Q",
            "",
            vec!["A".into()],
            vec![String::new()],
            vec!["A".into()],
            CategoryKey::new("B 1").unwrap(),
            None,
        )
        .unwrap();
        repo.upsert_question(&question).await.unwrap();
        let svc = BookmarkService::new(Arc::new(repo));
        let user = UserEmail::new("learner@example.org").unwrap();

        assert!(svc.toggle(question.number(), &user).await.unwrap().bookmarked);
        assert!(svc.is_bookmarked(question.number(), &user).await.unwrap());
        assert_eq!(svc.list(&user).await.unwrap(), vec![question.clone()]);

        assert!(!svc.toggle(question.number(), &user).await.unwrap().bookmarked);
        assert!(svc.list(&user).await.unwrap().is_empty());
    }
}
