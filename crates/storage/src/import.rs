use quiz_core::model::{Question, QuestionError, RawQuestionRecord};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("question file is not a JSON array: {0}")]
    NotAnArray(String),
}

/// Why a single record of a question file was skipped.
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error(transparent)]
    Invalid(#[from] QuestionError),
}

#[derive(Debug)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: RejectReason,
}

/// Result of parsing a question file: the usable questions plus what was dropped.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub questions: Vec<Question>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parse a JSON array of raw question records.
///
/// Each element is sanitized independently; a bad element is reported in
/// `rejected` and never aborts the import. A later record with the same
/// number replaces the earlier one.
///
/// # Errors
///
/// Returns `ImportError::NotAnArray` if the document is not a JSON array.
pub fn parse_question_records(json: &str) -> Result<ImportReport, ImportError> {
    let items: Vec<Value> =
        serde_json::from_str(json).map_err(|e| ImportError::NotAnArray(e.to_string()))?;

    let mut report = ImportReport::default();
    for (index, item) in items.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawQuestionRecord>(item)
            .map_err(|e| RejectReason::Malformed(e.to_string()))
            .and_then(|raw| raw.into_question().map_err(RejectReason::from));
        match parsed {
            Ok(question) => {
                match report
                    .questions
                    .iter_mut()
                    .find(|q| q.number() == question.number())
                {
                    Some(existing) => *existing = question,
                    None => report.questions.push(question),
                }
            }
            Err(reason) => report.rejected.push(RejectedRecord { index, reason }),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_valid_records_and_reports_the_rest() {
        let json = r#"[
            {"number": "1.1.01-001", "question": "Stop?", "answers": ["Yes", "No"],
             "correctAnswers": ["Yes"], "category": "GW 1.1"},
            {"number": "1.1.01-002", "question": "Go?", "answers": [],
             "correctAnswers": [], "category": "GW 1.1"},
            {"number": 7, "question": "Turn?", "answers": ["L", null],
             "correctAnswers": ["L"], "category": "B 2"},
            "not an object"
        ]"#;

        let report = parse_question_records(json).unwrap();

        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].number().as_str(), "1.1.01-001");
        let rejected: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![1, 2, 3]);
        assert!(matches!(
            report.rejected[1].reason,
            RejectReason::Invalid(QuestionError::NullAnswer { index: 1, .. })
        ));
        assert!(matches!(
            report.rejected[2].reason,
            RejectReason::Malformed(_)
        ));
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let json = r#"[
            {"number": "9", "question": "Old", "answers": ["A"],
             "correctAnswers": ["A"], "category": "B"},
            {"number": "9", "question": "New", "answers": ["A"],
             "correctAnswers": ["A"], "category": "B"}
        ]"#;

        let report = parse_question_records(json).unwrap();
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].text(), "New");
    }

    #[test]
    fn rejects_non_array_documents() {
        assert!(matches!(
            parse_question_records(r#"{"number": "1"}"#),
            Err(ImportError::NotAnArray(_))
        ));
    }
}
