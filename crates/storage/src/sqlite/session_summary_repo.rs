use quiz_core::model::{SessionSummary, UserEmail};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_summary_row, ser};
use crate::repository::{SessionSummaryRepository, SessionSummaryRow, StorageError};

#[async_trait::async_trait]
impl SessionSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_summaries (
                    user_email, kind, category, started_at, completed_at,
                    total, correct, wrong, timed_out
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(summary.user().as_str())
        .bind(summary.kind().as_str())
        .bind(summary.category().map(|c| c.as_str()))
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(summary.total()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.wrong()))
        .bind(i64::from(summary.timed_out()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    user_email, kind, category, started_at, completed_at,
                    total, correct, wrong, timed_out
                FROM session_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(
        &self,
        user: &UserEmail,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_email, kind, category, started_at, completed_at,
                    total, correct, wrong, timed_out
                FROM session_summaries
                WHERE user_email = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("id").map_err(ser)?;
                Ok(SessionSummaryRow::new(id, map_summary_row(row)?))
            })
            .collect()
    }
}
