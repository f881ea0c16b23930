use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{CategoryKey, QuestionNumber};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question number is missing or blank")]
    MissingNumber,

    #[error("question {number}: text is missing or blank")]
    MissingText { number: String },

    #[error("question {number}: category is missing or blank")]
    MissingCategory { number: String },

    #[error("question {number}: no answer options")]
    NoAnswers { number: String },

    #[error("question {number}: answer option {index} is null")]
    NullAnswer { number: String, index: usize },

    #[error("question {number}: duplicate answer option {value:?}")]
    DuplicateAnswer { number: String, value: String },

    #[error("question {number}: {answers} answers but {translated} translated answers")]
    TranslationMismatch {
        number: String,
        answers: usize,
        translated: usize,
    },

    #[error("question {number}: no correct answers")]
    NoCorrectAnswer { number: String },

    #[error("question {number}: correct answer {value:?} is not one of the options")]
    UnknownCorrectAnswer { number: String, value: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated, read-only catalog question.
///
/// `answers` and `translated_answers` are parallel: index `i` refers to the
/// same logical option in both. Correct answers are stored by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    number: QuestionNumber,
    text: String,
    translated_text: String,
    answers: Vec<String>,
    translated_answers: Vec<String>,
    correct_answers: Vec<String>,
    category: CategoryKey,
    image: Option<String>,
}

impl Question {
    /// Build a validated question.
    ///
    /// Correct answers are de-duplicated, keeping first occurrence order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, there are no options,
    /// an option is duplicated, the translated options do not line up, or a
    /// correct answer is not one of the options.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        number: QuestionNumber,
        text: impl Into<String>,
        translated_text: impl Into<String>,
        answers: Vec<String>,
        translated_answers: Vec<String>,
        correct_answers: Vec<String>,
        category: CategoryKey,
        image: Option<String>,
    ) -> Result<Self, QuestionError> {
        let id = number.as_str().to_string();
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::MissingText { number: id });
        }
        if answers.is_empty() {
            return Err(QuestionError::NoAnswers { number: id });
        }
        if answers.len() != translated_answers.len() {
            return Err(QuestionError::TranslationMismatch {
                number: id,
                answers: answers.len(),
                translated: translated_answers.len(),
            });
        }

        let mut seen = HashSet::with_capacity(answers.len());
        for answer in &answers {
            if !seen.insert(answer.as_str()) {
                return Err(QuestionError::DuplicateAnswer {
                    number: id,
                    value: answer.clone(),
                });
            }
        }

        let mut correct = Vec::with_capacity(correct_answers.len());
        for value in correct_answers {
            if !seen.contains(value.as_str()) {
                return Err(QuestionError::UnknownCorrectAnswer { number: id, value });
            }
            if !correct.contains(&value) {
                correct.push(value);
            }
        }
        if correct.is_empty() {
            return Err(QuestionError::NoCorrectAnswer { number: id });
        }

        let image = image.filter(|s| !s.trim().is_empty());

        Ok(Self {
            number,
            text,
            translated_text: translated_text.into(),
            answers,
            translated_answers,
            correct_answers: correct,
            category,
            image,
        })
    }

    #[must_use]
    pub fn number(&self) -> &QuestionNumber {
        &self.number
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn translated_answers(&self) -> &[String] {
        &self.translated_answers
    }

    #[must_use]
    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    #[must_use]
    pub fn category(&self) -> &CategoryKey {
        &self.category
    }

    /// Image reference (file name or absolute URL), if the question has one.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    #[must_use]
    pub fn has_option(&self, value: &str) -> bool {
        self.answers.iter().any(|a| a == value)
    }

    /// Copy of this question with both option arrays replaced.
    ///
    /// Callers must pass arrays that are a permutation of the current ones.
    pub(crate) fn with_reordered_answers(
        &self,
        answers: Vec<String>,
        translated_answers: Vec<String>,
    ) -> Self {
        Self {
            answers,
            translated_answers,
            ..self.clone()
        }
    }
}

//
// ─── RAW RECORD (ingestion boundary) ───────────────────────────────────────────
//

/// A question key as it arrives from an external store: text or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawKey {
    Text(String),
    Number(u64),
}

/// Loosely typed question record from an external store.
///
/// Every field is optional; `into_question` decides what can be sanitized and
/// what has to be rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawQuestionRecord {
    #[serde(default, alias = "questionNumber", alias = "question_number")]
    pub number: Option<RawKey>,
    #[serde(default, alias = "question")]
    pub text: Option<String>,
    #[serde(default, alias = "question_fa", alias = "questionFa")]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub answers: Option<Vec<Option<String>>>,
    #[serde(default, alias = "answers_fa", alias = "answersFa")]
    pub translated_answers: Option<Vec<Option<String>>>,
    #[serde(default, alias = "correctAnswers")]
    pub correct_answers: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "imageUrl", alias = "image_url")]
    pub image: Option<String>,
}

impl RawQuestionRecord {
    /// Parse into a strict `Question`.
    ///
    /// Null translated text and null translated options become empty strings; a
    /// missing translated option list is padded to the option count. Null
    /// correct answers are dropped.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for anything that cannot be sanitized.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        let number = match self.number {
            Some(RawKey::Text(s)) => QuestionNumber::new(s),
            Some(RawKey::Number(n)) => QuestionNumber::new(n.to_string()),
            None => return Err(QuestionError::MissingNumber),
        }
        .map_err(|_| QuestionError::MissingNumber)?;
        let id = number.as_str().to_string();

        let text = self
            .text
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| QuestionError::MissingText { number: id.clone() })?;

        let category = self
            .category
            .and_then(|c| CategoryKey::new(c).ok())
            .ok_or_else(|| QuestionError::MissingCategory { number: id.clone() })?;

        let raw_answers = self
            .answers
            .filter(|a| !a.is_empty())
            .ok_or_else(|| QuestionError::NoAnswers { number: id.clone() })?;
        let mut answers = Vec::with_capacity(raw_answers.len());
        for (index, answer) in raw_answers.into_iter().enumerate() {
            let answer = answer.ok_or_else(|| QuestionError::NullAnswer {
                number: id.clone(),
                index,
            })?;
            answers.push(answer);
        }

        let translated_answers = match self.translated_answers {
            Some(list) => list.into_iter().map(Option::unwrap_or_default).collect(),
            None => vec![String::new(); answers.len()],
        };

        let correct_answers = self
            .correct_answers
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect();

        Question::new(
            number,
            text,
            self.translated_text.unwrap_or_default(),
            answers,
            translated_answers,
            correct_answers,
            category,
            self.image,
        )
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn build(
        answers: &[&str],
        translated: &[&str],
        correct: &[&str],
    ) -> Result<Question, QuestionError> {
        Question::new(
            QuestionNumber::new("1.1.01-001").unwrap(),
            "Where do you stop?",
            "",
            strings(answers),
            strings(translated),
            strings(correct),
            CategoryKey::new("GW 1.1").unwrap(),
            None,
        )
    }

    #[test]
    fn valid_question_dedups_correct_answers() {
        let q = build(&["A", "B", "C"], &["a", "b", "c"], &["B", "A", "B"]).unwrap();
        assert_eq!(q.correct_answers(), &strings(&["B", "A"])[..]);
        assert!(q.has_option("C"));
        assert!(!q.has_option("D"));
    }

    #[test]
    fn translation_length_must_match() {
        let err = build(&["A", "B"], &["a"], &["A"]).unwrap_err();
        assert!(matches!(
            err,
            QuestionError::TranslationMismatch {
                answers: 2,
                translated: 1,
                ..
            }
        ));
    }

    #[test]
    fn correct_answer_must_be_an_option() {
        let err = build(&["A", "B"], &["a", "b"], &["Z"]).unwrap_err();
        assert!(matches!(err, QuestionError::UnknownCorrectAnswer { .. }));
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let err = build(&["A", "A"], &["a", "b"], &["A"]).unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateAnswer { .. }));
    }

    #[test]
    fn question_needs_a_correct_answer() {
        let err = build(&["A", "B"], &["a", "b"], &[]).unwrap_err();
        assert!(matches!(err, QuestionError::NoCorrectAnswer { .. }));
    }

    #[test]
    fn raw_record_accepts_original_field_names() {
        let json = r#"{
            "questionNumber": 17,
            "question": "Speed limit in town?",
            "question_fa": null,
            "answers": ["30", "50"],
            "answers_fa": ["۳۰", null],
            "correct_answers": ["50", null],
            "category": "GW 2.1"
        }"#;
        let raw: RawQuestionRecord = serde_json::from_str(json).unwrap();
        let q = raw.into_question().unwrap();

        assert_eq!(q.number().as_str(), "17");
        assert_eq!(q.translated_text(), "");
        assert_eq!(q.translated_answers(), &strings(&["۳۰", ""])[..]);
        assert_eq!(q.correct_answers(), &strings(&["50"])[..]);
        assert_eq!(q.category().group().unwrap().as_str(), "GW");
    }

    #[test]
    fn raw_record_pads_missing_translations() {
        let raw = RawQuestionRecord {
            number: Some(RawKey::Text("B-1".into())),
            text: Some("Q".into()),
            answers: Some(vec![Some("x".into()), Some("y".into())]),
            correct_answers: Some(vec![Some("y".into())]),
            category: Some("B 1".into()),
            ..RawQuestionRecord::default()
        };
        let q = raw.into_question().unwrap();
        assert_eq!(q.translated_answers().len(), 2);
    }

    #[test]
    fn raw_record_rejects_missing_arrays_and_null_options() {
        let missing = RawQuestionRecord {
            number: Some(RawKey::Number(1)),
            text: Some("Q".into()),
            category: Some("GW".into()),
            ..RawQuestionRecord::default()
        };
        assert!(matches!(
            missing.clone().into_question(),
            Err(QuestionError::NoAnswers { .. })
        ));

        let null_option = RawQuestionRecord {
            answers: Some(vec![Some("x".into()), None]),
            correct_answers: Some(vec![Some("x".into())]),
            ..missing
        };
        assert!(matches!(
            null_option.into_question(),
            Err(QuestionError::NullAnswer { index: 1, .. })
        ));
    }

    #[test]
    fn raw_record_without_number_is_rejected() {
        let raw = RawQuestionRecord {
            number: Some(RawKey::Text("  ".into())),
            ..RawQuestionRecord::default()
        };
        assert_eq!(raw.into_question(), Err(QuestionError::MissingNumber));
    }
}
