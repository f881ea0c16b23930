use quiz_core::model::{
    CategoryKey, ProgressRecord, Question, QuestionNumber, SessionKind, SessionSummary, UserEmail,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn bool_from_i64(field: &'static str, v: i64) -> Result<bool, StorageError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StorageError::Serialization(format!(
            "invalid {field}: {other}"
        ))),
    }
}

pub(crate) fn encode_list(values: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(values).map_err(ser)
}

fn decode_list(field: &'static str, raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("invalid {field}: {e}")))
}

/// Maps a `questions` row back into a validated `Question`.
pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let number = QuestionNumber::new(row.try_get::<String, _>("number").map_err(ser)?)
        .map_err(ser)?;
    let category =
        CategoryKey::new(row.try_get::<String, _>("category").map_err(ser)?).map_err(ser)?;
    let answers = decode_list("answers", &row.try_get::<String, _>("answers").map_err(ser)?)?;
    let translated_answers = decode_list(
        "translated_answers",
        &row.try_get::<String, _>("translated_answers").map_err(ser)?,
    )?;
    let correct_answers = decode_list(
        "correct_answers",
        &row.try_get::<String, _>("correct_answers").map_err(ser)?,
    )?;

    Question::new(
        number,
        row.try_get::<String, _>("text").map_err(ser)?,
        row.try_get::<String, _>("translated_text").map_err(ser)?,
        answers,
        translated_answers,
        correct_answers,
        category,
        row.try_get::<Option<String>, _>("image").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    Ok(ProgressRecord {
        question: QuestionNumber::new(row.try_get::<String, _>("question_number").map_err(ser)?)
            .map_err(ser)?,
        user: UserEmail::new(row.try_get::<String, _>("user_email").map_err(ser)?)
            .map_err(ser)?,
        category: CategoryKey::new(row.try_get::<String, _>("category").map_err(ser)?)
            .map_err(ser)?,
        attempts: u32_from_i64("attempts", row.try_get::<i64, _>("attempts").map_err(ser)?)?,
        last_correct: bool_from_i64(
            "last_correct",
            row.try_get::<i64, _>("last_correct").map_err(ser)?,
        )?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_summary_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummary, StorageError> {
    let user = UserEmail::new(row.try_get::<String, _>("user_email").map_err(ser)?).map_err(ser)?;
    let kind = SessionKind::parse(&row.try_get::<String, _>("kind").map_err(ser)?).map_err(ser)?;
    let category = row
        .try_get::<Option<String>, _>("category")
        .map_err(ser)?
        .map(CategoryKey::new)
        .transpose()
        .map_err(ser)?;

    SessionSummary::from_persisted(
        user,
        kind,
        category,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
        u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
        u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?,
        u32_from_i64("wrong", row.try_get::<i64, _>("wrong").map_err(ser)?)?,
        bool_from_i64("timed_out", row.try_get::<i64, _>("timed_out").map_err(ser)?)?,
    )
    .map_err(ser)
}
