use serde::Serialize;

use quiz_core::model::{GradedAnswer, MediaUri, ScoreResult, SessionKind, WorkingQuestion};

use super::navigator::{AnswerState, EndReason, Navigator, Phase};

/// Presentation-agnostic view of the question on screen.
///
/// Correct answers are only exposed once the question is checked, and never
/// during an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub number: String,
    pub category: String,
    pub text: String,
    pub translated_text: String,
    pub answers: Vec<String>,
    pub translated_answers: Vec<String>,
    pub image: Option<String>,
    pub selected: Vec<String>,
    pub checked: bool,
    pub correct: Option<bool>,
    pub correct_answers: Option<Vec<String>>,
}

impl QuestionView {
    #[must_use]
    pub fn new(
        question: &WorkingQuestion,
        state: &AnswerState,
        kind: SessionKind,
        image: Option<&MediaUri>,
    ) -> Self {
        let reveal = state.checked && !kind.is_exam();
        Self {
            number: question.number().to_string(),
            category: question.category().to_string(),
            text: question.question().text().to_string(),
            translated_text: question.question().translated_text().to_string(),
            answers: question.answers().to_vec(),
            translated_answers: question.translated_answers().to_vec(),
            image: image.map(ToString::to_string),
            selected: state.selection.values().to_vec(),
            checked: state.checked,
            correct: state.correct,
            correct_answers: reveal.then(|| question.correct_answers().to_vec()),
        }
    }
}

/// Snapshot of a running session for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub kind: &'static str,
    #[serde(flatten)]
    pub phase: Phase,
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub attempted: usize,
    pub remaining_secs: Option<u32>,
    pub clock_label: Option<String>,
    pub reveal_all: bool,
    pub question: Option<QuestionView>,
}

impl SessionSnapshot {
    pub(crate) fn from_navigator(
        session_id: String,
        nav: &Navigator,
        image: Option<&MediaUri>,
    ) -> Self {
        let question = nav
            .current_question()
            .map(|q| QuestionView::new(q, nav.current_state(), nav.kind(), image));
        Self {
            session_id,
            kind: nav.kind().as_str(),
            phase: nav.phase(),
            position: if nav.is_empty() {
                0
            } else {
                nav.current_index() + 1
            },
            total: nav.len(),
            attempted: nav.attempted(),
            remaining_secs: nav.remaining_secs(),
            clock_label: nav.clock_label(),
            reveal_all: nav.reveal_all(),
            question,
        }
    }
}

/// Entry of the "review wrong answers" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerReview {
    pub number: String,
    pub category: String,
    pub text: String,
    pub translated_text: String,
    pub correct_answers: Vec<String>,
    pub user_answers: Vec<String>,
}

impl From<&GradedAnswer> for AnswerReview {
    fn from(graded: &GradedAnswer) -> Self {
        Self {
            number: graded.number.to_string(),
            category: graded.category.to_string(),
            text: graded.text.clone(),
            translated_text: graded.translated_text.clone(),
            correct_answers: graded.correct_answers.clone(),
            user_answers: graded.user_answers.clone(),
        }
    }
}

/// Result screen data. `score_percent` is `None` when nothing was answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub kind: &'static str,
    pub total_answered: usize,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub score_percent: Option<f64>,
    pub timed_out: bool,
    pub wrong: Vec<AnswerReview>,
}

impl SessionReport {
    #[must_use]
    pub fn new(kind: SessionKind, phase: Phase, score: &ScoreResult) -> Self {
        Self {
            kind: kind.as_str(),
            total_answered: score.total_answered(),
            correct_count: score.correct_count(),
            wrong_count: score.wrong_count(),
            score_percent: score.score_percent(),
            timed_out: phase == Phase::Ended(EndReason::TimedOut),
            wrong: score.wrong_list().iter().map(AnswerReview::from).collect(),
        }
    }

    #[must_use]
    pub fn nothing_answered(&self) -> bool {
        self.total_answered == 0
    }
}
