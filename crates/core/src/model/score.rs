use crate::grading::Selection;
use crate::model::ids::{CategoryKey, QuestionNumber};
use crate::model::working::WorkingQuestion;

/// One answered exam question, appended as the learner moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamAnswerRecord {
    pub question: WorkingQuestion,
    pub user_answers: Vec<String>,
}

impl ExamAnswerRecord {
    #[must_use]
    pub fn new(question: WorkingQuestion, user_answers: Selection) -> Self {
        Self {
            question,
            user_answers: user_answers.into_values(),
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.question.is_all_correct(&self.user_answers)
    }
}

/// A graded entry that can be shown later without the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub number: QuestionNumber,
    pub text: String,
    pub translated_text: String,
    pub category: CategoryKey,
    pub correct_answers: Vec<String>,
    pub user_answers: Vec<String>,
    pub is_correct: bool,
}

impl GradedAnswer {
    #[must_use]
    pub fn from_record(record: &ExamAnswerRecord) -> Self {
        let question = record.question.question();
        Self {
            number: question.number().clone(),
            text: question.text().to_string(),
            translated_text: question.translated_text().to_string(),
            category: question.category().clone(),
            correct_answers: question.correct_answers().to_vec(),
            user_answers: record.user_answers.clone(),
            is_correct: record.is_correct(),
        }
    }
}

/// Correct/wrong partition of a finished session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreResult {
    correct: Vec<GradedAnswer>,
    wrong: Vec<GradedAnswer>,
}

impl ScoreResult {
    /// Partition records by exact set equality, preserving record order.
    #[must_use]
    pub fn from_records(records: &[ExamAnswerRecord]) -> Self {
        let (correct, wrong) = records
            .iter()
            .map(GradedAnswer::from_record)
            .partition(|graded| graded.is_correct);
        Self { correct, wrong }
    }

    #[must_use]
    pub fn correct_list(&self) -> &[GradedAnswer] {
        &self.correct
    }

    #[must_use]
    pub fn wrong_list(&self) -> &[GradedAnswer] {
        &self.wrong
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct.len()
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.wrong.len()
    }

    #[must_use]
    pub fn total_answered(&self) -> usize {
        self.correct.len() + self.wrong.len()
    }

    /// `true` when nothing was answered; callers show a dedicated empty state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_answered() == 0
    }

    /// Percentage of correct answers rounded to two decimals, or `None` when
    /// nothing was answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score_percent(&self) -> Option<f64> {
        let total = self.total_answered();
        if total == 0 {
            return None;
        }
        let raw = self.correct_count() as f64 * 100.0 / total as f64;
        Some(round2(raw))
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Question;

    fn working(id: u32) -> WorkingQuestion {
        let q = Question::new(
            QuestionNumber::new(format!("1.{id}")).unwrap(),
            format!("Question {id}"),
            "",
            vec!["yes".into(), "no".into(), "maybe".into()],
            vec![String::new(), String::new(), String::new()],
            vec!["yes".into(), "maybe".into()],
            CategoryKey::new("B 1").unwrap(),
            None,
        )
        .unwrap();
        WorkingQuestion::unshuffled(&q)
    }

    #[test]
    fn seventy_percent_when_seven_of_ten_correct() {
        let records: Vec<_> = (0..10)
            .map(|i| {
                let answers = if i < 7 {
                    Selection::from_values(["maybe", "yes"])
                } else {
                    Selection::from_values(["yes"])
                };
                ExamAnswerRecord::new(working(i), answers)
            })
            .collect();

        let result = ScoreResult::from_records(&records);

        assert_eq!(result.score_percent(), Some(70.0));
        assert_eq!(result.correct_list().len(), 7);
        assert_eq!(result.wrong_list().len(), 3);
    }

    #[test]
    fn wrong_entries_keep_review_details() {
        let records = vec![ExamAnswerRecord::new(working(4), Selection::new())];
        let result = ScoreResult::from_records(&records);

        let wrong = &result.wrong_list()[0];
        assert_eq!(wrong.number.as_str(), "1.4");
        assert_eq!(wrong.text, "Question 4");
        assert_eq!(wrong.correct_answers, vec!["yes".to_string(), "maybe".to_string()]);
        assert!(wrong.user_answers.is_empty());
    }

    #[test]
    fn nothing_answered_has_no_score() {
        let result = ScoreResult::from_records(&[]);
        assert!(result.is_empty());
        assert_eq!(result.score_percent(), None);
    }

    #[test]
    fn score_rounds_to_two_decimals() {
        let records = vec![
            ExamAnswerRecord::new(working(1), Selection::from_values(["yes", "maybe"])),
            ExamAnswerRecord::new(working(2), Selection::new()),
            ExamAnswerRecord::new(working(3), Selection::new()),
        ];
        let result = ScoreResult::from_records(&records);
        assert_eq!(result.score_percent(), Some(33.33));
    }
}
