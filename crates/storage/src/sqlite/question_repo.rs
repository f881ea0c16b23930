use quiz_core::model::{CategoryKey, Question, QuestionNumber};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, encode_list, map_question_row, ser};
use crate::repository::{QuestionCatalog, StorageError};

const QUESTION_COLUMNS: &str = r"
    number, text, translated_text, answers, translated_answers,
    correct_answers, category, image
";

#[async_trait::async_trait]
impl QuestionCatalog for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO questions (
                    number, position, text, translated_text, answers,
                    translated_answers, correct_answers, category, image
                )
                VALUES (
                    ?1,
                    (SELECT COALESCE(MAX(position), 0) + 1 FROM questions),
                    ?2, ?3, ?4, ?5, ?6, ?7, ?8
                )
                ON CONFLICT(number) DO UPDATE SET
                    text = excluded.text,
                    translated_text = excluded.translated_text,
                    answers = excluded.answers,
                    translated_answers = excluded.translated_answers,
                    correct_answers = excluded.correct_answers,
                    category = excluded.category,
                    image = excluded.image
            ",
        )
        .bind(question.number().as_str())
        .bind(question.text())
        .bind(question.translated_text())
        .bind(encode_list(question.answers())?)
        .bind(encode_list(question.translated_answers())?)
        .bind(encode_list(question.correct_answers())?)
        .bind(question.category().as_str())
        .bind(question.image())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Question>, StorageError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions ORDER BY position ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn list_by_category(
        &self,
        category: &CategoryKey,
    ) -> Result<Vec<Question>, StorageError> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE category = ?1 ORDER BY position ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(category.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn get_questions(
        &self,
        numbers: &[QuestionNumber],
    ) -> Result<Vec<Question>, StorageError> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=numbers.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE number IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql);
        for number in numbers {
            query = query.bind(number.as_str());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let found = rows
            .iter()
            .map(map_question_row)
            .collect::<Result<Vec<_>, _>>()?;
        numbers
            .iter()
            .map(|number| {
                found
                    .iter()
                    .find(|q| q.number() == number)
                    .cloned()
                    .ok_or(StorageError::NotFound)
            })
            .collect()
    }

    async fn list_categories(&self) -> Result<Vec<(CategoryKey, usize)>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT category, COUNT(*) AS total, MIN(position) AS first_position
                FROM questions
                GROUP BY category
                ORDER BY first_position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let key = CategoryKey::new(row.try_get::<String, _>("category").map_err(ser)?)
                    .map_err(ser)?;
                let total: i64 = row.try_get("total").map_err(ser)?;
                let total = usize::try_from(total)
                    .map_err(|_| StorageError::Serialization(format!("invalid total: {total}")))?;
                Ok((key, total))
            })
            .collect()
    }
}
