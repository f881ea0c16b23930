use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates questions, per-user progress, bookmarks, session summaries, and indexes.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        // Option lists are JSON arrays; `position` keeps catalog order stable across upserts.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    number TEXT PRIMARY KEY,
                    position INTEGER NOT NULL,
                    text TEXT NOT NULL,
                    translated_text TEXT NOT NULL,
                    answers TEXT NOT NULL,
                    translated_answers TEXT NOT NULL,
                    correct_answers TEXT NOT NULL,
                    category TEXT NOT NULL,
                    image TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress (
                    question_number TEXT NOT NULL,
                    user_email TEXT NOT NULL,
                    category TEXT NOT NULL,
                    attempts INTEGER NOT NULL CHECK (attempts >= 1),
                    last_correct INTEGER NOT NULL CHECK (last_correct IN (0, 1)),
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (question_number, user_email),
                    FOREIGN KEY (question_number) REFERENCES questions(number) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS bookmarks (
                    id INTEGER PRIMARY KEY,
                    question_number TEXT NOT NULL,
                    user_email TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    UNIQUE (question_number, user_email),
                    FOREIGN KEY (question_number) REFERENCES questions(number) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS session_summaries (
                    id INTEGER PRIMARY KEY,
                    user_email TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    category TEXT,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL,
                    total INTEGER NOT NULL CHECK (total >= 0),
                    correct INTEGER NOT NULL CHECK (correct >= 0),
                    wrong INTEGER NOT NULL CHECK (wrong >= 0),
                    timed_out INTEGER NOT NULL CHECK (timed_out IN (0, 1))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_questions_category_position
                    ON questions(category, position);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user
                    ON progress(user_email, question_number);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_session_summaries_user_completed
                    ON session_summaries (user_email, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
