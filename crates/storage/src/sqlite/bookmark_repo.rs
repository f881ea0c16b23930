use chrono::Utc;
use quiz_core::model::{BookmarkToggle, Question, QuestionNumber, UserEmail};

use super::SqliteRepository;
use super::mapping::{conn, map_question_row};
use crate::repository::{BookmarkRepository, StorageError};

#[async_trait::async_trait]
impl BookmarkRepository for SqliteRepository {
    async fn toggle_bookmark(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<BookmarkToggle, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists = sqlx::query("SELECT 1 FROM questions WHERE number = ?1")
            .bind(question.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        let removed = sqlx::query(
            r"
                DELETE FROM bookmarks
                WHERE question_number = ?1 AND user_email = ?2
            ",
        )
        .bind(question.as_str())
        .bind(user.as_str())
        .execute(&mut *tx)
        .await
        .map_err(conn)?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r"
                    INSERT INTO bookmarks (question_number, user_email, created_at)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(question.as_str())
            .bind(user.as_str())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(BookmarkToggle {
            bookmarked: removed == 0,
        })
    }

    async fn is_bookmarked(
        &self,
        question: &QuestionNumber,
        user: &UserEmail,
    ) -> Result<bool, StorageError> {
        let row = sqlx::query(
            "SELECT 1 FROM bookmarks WHERE question_number = ?1 AND user_email = ?2",
        )
        .bind(question.as_str())
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;
        Ok(row.is_some())
    }

    async fn list_bookmarks(&self, user: &UserEmail) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    q.number, q.text, q.translated_text, q.answers, q.translated_answers,
                    q.correct_answers, q.category, q.image
                FROM bookmarks b
                JOIN questions q ON q.number = b.question_number
                WHERE b.user_email = ?1
                ORDER BY b.id ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}
