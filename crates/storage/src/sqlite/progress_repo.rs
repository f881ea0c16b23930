use chrono::{DateTime, Utc};
use quiz_core::model::{Attempt, ProgressRecord, UserEmail};

use super::SqliteRepository;
use super::mapping::{conn, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn record_attempt(
        &self,
        attempt: &Attempt,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO progress (
                    question_number, user_email, category, attempts, last_correct, updated_at
                )
                VALUES (?1, ?2, ?3, 1, ?4, ?5)
                ON CONFLICT(question_number, user_email) DO UPDATE SET
                    attempts = progress.attempts + 1,
                    last_correct = excluded.last_correct,
                    category = excluded.category,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(attempt.question.as_str())
        .bind(attempt.user.as_str())
        .bind(attempt.category.as_str())
        .bind(i64::from(attempt.is_correct))
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StorageError::NotFound,
            other => conn(other),
        })?;

        let row = sqlx::query(
            r"
                SELECT question_number, user_email, category, attempts, last_correct, updated_at
                FROM progress
                WHERE question_number = ?1 AND user_email = ?2
            ",
        )
        .bind(attempt.question.as_str())
        .bind(attempt.user.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        map_progress_row(&row)
    }

    async fn get_progress(&self, user: &UserEmail) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT question_number, user_email, category, attempts, last_correct, updated_at
                FROM progress
                WHERE user_email = ?1
                ORDER BY question_number ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_progress_row).collect()
    }
}
