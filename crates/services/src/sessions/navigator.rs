use serde::Serialize;
use thiserror::Error;

use quiz_core::grading::Selection;
use quiz_core::model::{
    CategoryKey, ExamAnswerRecord, QuestionNumber, ScoreResult, SessionKind, WorkingQuestion,
};
use quiz_core::{Countdown, CountdownTick, SessionSettings};

use super::spec::ExitDestination;

//
// ─── PHASES & OUTCOMES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The working set was exhausted.
    Completed,
    /// The exam countdown reached zero.
    TimedOut,
    /// The learner left the session.
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "reason")]
pub enum Phase {
    Loading,
    Active,
    /// Nothing to show: the working set was empty.
    Empty,
    Ended(EndReason),
}

impl Phase {
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Active)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Empty | Phase::Ended(_))
    }
}

/// A transition that was refused; the navigator is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionRejected {
    #[error("session is not active")]
    NotActive,
    #[error("current question is already checked")]
    AlreadyChecked,
    #[error("current question has not been checked")]
    NotChecked,
    #[error("{0:?} is not an option of the current question")]
    UnknownOption(String),
    #[error("not available during an exam")]
    ExamMode,
    #[error("only available during an exam")]
    NotExam,
    #[error("already at the first question")]
    AtFirstQuestion,
}

/// Selections and check state of one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    pub selection: Selection,
    pub checked: bool,
    /// `None` while unchecked, and for questions revealed without grading.
    pub correct: Option<bool>,
}

impl AnswerState {
    fn revealed() -> Self {
        Self {
            checked: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub question: QuestionNumber,
    pub category: CategoryKey,
    pub is_correct: bool,
    /// Whether this attempt should be reported to the progress gateway.
    pub record_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    Ended { destination: ExitDestination },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running { remaining_secs: u32 },
    TimedOut,
    /// Not an active exam; nothing changed.
    Inactive,
}

//
// ─── NAVIGATOR ─────────────────────────────────────────────────────────────────
//

/// Single-question-at-a-time state machine over a working set.
///
/// Every transition validates its preconditions before writing, so a
/// rejected transition never leaves partial changes behind.
#[derive(Debug, Clone)]
pub struct Navigator {
    kind: SessionKind,
    questions: Vec<WorkingQuestion>,
    current: usize,
    live: AnswerState,
    history: Vec<Option<AnswerState>>,
    phase: Phase,
    countdown: Option<Countdown>,
    attempted: usize,
    exam_records: Vec<ExamAnswerRecord>,
    reveal_all: bool,
}

impl Navigator {
    #[must_use]
    pub fn new(
        kind: SessionKind,
        questions: Vec<WorkingQuestion>,
        settings: &SessionSettings,
    ) -> Self {
        let history = vec![None; questions.len()];
        Self {
            kind,
            questions,
            current: 0,
            live: AnswerState::default(),
            history,
            phase: Phase::Loading,
            countdown: kind
                .is_exam()
                .then(|| Countdown::new(settings.exam_duration_secs())),
            attempted: 0,
            exam_records: Vec::new(),
            reveal_all: settings.reveal_all_answers(),
        }
    }

    /// Leave `Loading`: `Active` on the first question, or `Empty`.
    pub fn begin(&mut self) -> Phase {
        if self.phase == Phase::Loading {
            if self.questions.is_empty() {
                self.phase = Phase::Empty;
            } else {
                self.phase = Phase::Active;
                self.live = self.fresh_state();
            }
        }
        self.phase
    }

    // ─── Transitions ───────────────────────────────────────────────────────

    /// Toggle `value` in the current selections. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Rejected when not active, when the question is already checked, or when
    /// `value` is not one of its options.
    pub fn select_option(&mut self, value: &str) -> Result<bool, TransitionRejected> {
        let index = self.active_index()?;
        if self.live.checked {
            return Err(TransitionRejected::AlreadyChecked);
        }
        let known = self
            .questions
            .get(index)
            .is_some_and(|q| q.question().has_option(value));
        if !known {
            return Err(TransitionRejected::UnknownOption(value.to_string()));
        }
        Ok(self.live.selection.toggle(value))
    }

    /// Lock the current selections and grade them.
    ///
    /// # Errors
    ///
    /// Rejected in exams, when not active, or when already checked.
    pub fn check(&mut self) -> Result<CheckOutcome, TransitionRejected> {
        let index = self.active_index()?;
        if self.kind.is_exam() {
            return Err(TransitionRejected::ExamMode);
        }
        if self.live.checked {
            return Err(TransitionRejected::AlreadyChecked);
        }
        let question = self
            .questions
            .get(index)
            .ok_or(TransitionRejected::NotActive)?;
        let is_correct = question.is_all_correct(self.live.selection.values());
        let outcome = CheckOutcome {
            question: question.number().clone(),
            category: question.category().clone(),
            is_correct,
            record_progress: self.kind == SessionKind::CategoryReview,
        };

        self.live.checked = true;
        self.live.correct = Some(is_correct);
        Ok(outcome)
    }

    /// Move forward after a check; ends the session past the last question.
    ///
    /// # Errors
    ///
    /// Rejected in exams, when not active, or when the question is unchecked.
    pub fn next(&mut self) -> Result<Advance, TransitionRejected> {
        let index = self.active_index()?;
        if self.kind.is_exam() {
            return Err(TransitionRejected::ExamMode);
        }
        if !self.live.checked {
            return Err(TransitionRejected::NotChecked);
        }

        self.history[index] = Some(self.live.clone());
        if index + 1 >= self.questions.len() {
            self.phase = Phase::Ended(EndReason::Completed);
            return Ok(Advance::Ended {
                destination: ExitDestination::for_kind(self.kind),
            });
        }
        self.current = index + 1;
        self.live = self.restore_or_fresh(self.current);
        Ok(Advance::Moved {
            index: self.current,
        })
    }

    /// Step back one question, restoring its recorded state.
    ///
    /// Unchecked selections on the question being left are discarded.
    ///
    /// # Errors
    ///
    /// Rejected in exams, when not active, or on the first question.
    pub fn previous(&mut self) -> Result<usize, TransitionRejected> {
        let index = self.active_index()?;
        if self.kind.is_exam() {
            return Err(TransitionRejected::ExamMode);
        }
        if index == 0 {
            return Err(TransitionRejected::AtFirstQuestion);
        }

        if self.live.checked {
            self.history[index] = Some(self.live.clone());
        }
        self.current = index - 1;
        self.live = self.restore_or_fresh(self.current);
        Ok(self.current)
    }

    /// Record the current selections (possibly empty) and move on.
    ///
    /// # Errors
    ///
    /// Rejected outside exams or when not active.
    pub fn exam_next(&mut self) -> Result<Advance, TransitionRejected> {
        let index = self.active_index()?;
        if !self.kind.is_exam() {
            return Err(TransitionRejected::NotExam);
        }
        let question = self
            .questions
            .get(index)
            .cloned()
            .ok_or(TransitionRejected::NotActive)?;

        let selection = std::mem::take(&mut self.live.selection);
        self.exam_records
            .push(ExamAnswerRecord::new(question, selection));
        self.attempted += 1;

        if self.attempted >= self.questions.len() || index + 1 >= self.questions.len() {
            self.phase = Phase::Ended(EndReason::Completed);
            return Ok(Advance::Ended {
                destination: ExitDestination::ExamResult,
            });
        }
        self.current = index + 1;
        self.live = AnswerState::default();
        Ok(Advance::Moved {
            index: self.current,
        })
    }

    /// One elapsed countdown period.
    pub fn tick(&mut self) -> TimerTick {
        if !self.phase.is_active() {
            return TimerTick::Inactive;
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return TimerTick::Inactive;
        };
        match countdown.tick() {
            CountdownTick::Running(remaining_secs) => TimerTick::Running { remaining_secs },
            CountdownTick::Expired | CountdownTick::AlreadyExpired => {
                self.phase = Phase::Ended(EndReason::TimedOut);
                TimerTick::TimedOut
            }
        }
    }

    /// End the session. Returns `false` if it had already finished.
    pub fn end(&mut self, reason: EndReason) -> bool {
        match self.phase {
            Phase::Loading | Phase::Active => {
                self.phase = Phase::Ended(reason);
                true
            }
            Phase::Empty | Phase::Ended(_) => false,
        }
    }

    /// Questions visited for the first time from now on start revealed.
    /// Exams ignore this.
    pub fn set_reveal_all(&mut self, reveal: bool) {
        self.reveal_all = reveal;
    }

    // ─── Reads ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[WorkingQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question on screen, while active.
    #[must_use]
    pub fn current_question(&self) -> Option<&WorkingQuestion> {
        if self.phase.is_active() {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn current_state(&self) -> &AnswerState {
        &self.live
    }

    #[must_use]
    pub fn reveal_all(&self) -> bool {
        self.reveal_all
    }

    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining_secs())
    }

    #[must_use]
    pub fn clock_label(&self) -> Option<String> {
        self.countdown.map(|c| c.clock_label())
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    #[must_use]
    pub fn exam_records(&self) -> &[ExamAnswerRecord] {
        &self.exam_records
    }

    /// Graded questions as answer records: the exam records in exams,
    /// otherwise every checked question with a recorded correctness.
    #[must_use]
    pub fn answer_records(&self) -> Vec<ExamAnswerRecord> {
        if self.kind.is_exam() {
            return self.exam_records.clone();
        }
        self.questions
            .iter()
            .enumerate()
            .filter_map(|(i, question)| {
                let state = if i == self.current {
                    Some(&self.live)
                } else {
                    self.history[i].as_ref()
                };
                state
                    .filter(|s| s.checked && s.correct.is_some())
                    .map(|s| ExamAnswerRecord::new(question.clone(), s.selection.clone()))
            })
            .collect()
    }

    /// Current correct/wrong partition; safe to call at any time.
    #[must_use]
    pub fn score(&self) -> ScoreResult {
        ScoreResult::from_records(&self.answer_records())
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn active_index(&mut self) -> Result<usize, TransitionRejected> {
        if !self.phase.is_active() {
            return Err(TransitionRejected::NotActive);
        }
        if self.current >= self.questions.len() {
            self.phase = Phase::Ended(EndReason::Completed);
            return Err(TransitionRejected::NotActive);
        }
        Ok(self.current)
    }

    fn fresh_state(&self) -> AnswerState {
        if self.reveal_all && !self.kind.is_exam() {
            AnswerState::revealed()
        } else {
            AnswerState::default()
        }
    }

    fn restore_or_fresh(&self, index: usize) -> AnswerState {
        self.history
            .get(index)
            .cloned()
            .flatten()
            .unwrap_or_else(|| self.fresh_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionNumber};

    fn question(number: &str, options: &[&str], correct: &[&str]) -> WorkingQuestion {
        let q = Question::new(
            QuestionNumber::new(number).unwrap(),
            format!("Question {number}"),
            "",
            options.iter().map(|s| (*s).to_string()).collect(),
            options.iter().map(|_| String::new()).collect(),
            correct.iter().map(|s| (*s).to_string()).collect(),
            CategoryKey::new("GW 1.1").unwrap(),
            None,
        )
        .unwrap();
        WorkingQuestion::unshuffled(&q)
    }

    fn abc(number: &str) -> WorkingQuestion {
        question(number, &["A", "B", "C"], &["A", "B"])
    }

    fn started(kind: SessionKind, count: usize) -> Navigator {
        let questions = (0..count).map(|i| abc(&format!("q{i}"))).collect();
        let mut nav = Navigator::new(kind, questions, &SessionSettings::default());
        nav.begin();
        nav
    }

    fn select_all(nav: &mut Navigator, values: &[&str]) {
        for value in values {
            nav.select_option(value).unwrap();
        }
    }

    #[test]
    fn check_uses_exact_set_equality() {
        for (selected, expected) in [
            (&["A", "B"][..], true),
            (&["B", "A"][..], true),
            (&["A"][..], false),
            (&["A", "B", "C"][..], false),
            (&[][..], false),
        ] {
            let mut nav = started(SessionKind::FreeQuiz, 1);
            select_all(&mut nav, selected);
            let outcome = nav.check().unwrap();
            assert_eq!(outcome.is_correct, expected, "selection {selected:?}");
            assert!(!outcome.record_progress);
            assert_eq!(nav.current_state().correct, Some(expected));
        }
    }

    #[test]
    fn category_review_checks_request_progress_recording() {
        let mut nav = started(SessionKind::CategoryReview, 1);
        assert!(nav.check().unwrap().record_progress);
    }

    #[test]
    fn selections_lock_after_check() {
        let mut nav = started(SessionKind::FreeQuiz, 2);
        assert!(nav.select_option("A").unwrap());
        assert!(!nav.select_option("A").unwrap());
        nav.select_option("C").unwrap();
        nav.check().unwrap();

        assert_eq!(nav.select_option("B"), Err(TransitionRejected::AlreadyChecked));
        assert_eq!(nav.check(), Err(TransitionRejected::AlreadyChecked));
        assert_eq!(nav.current_state().selection.values(), &["C".to_string()]);
    }

    #[test]
    fn unknown_option_is_rejected_without_changes() {
        let mut nav = started(SessionKind::FreeQuiz, 1);
        assert_eq!(
            nav.select_option("Z"),
            Err(TransitionRejected::UnknownOption("Z".into()))
        );
        assert!(nav.current_state().selection.is_empty());
    }

    #[test]
    fn next_requires_check() {
        let mut nav = started(SessionKind::FreeQuiz, 2);
        assert_eq!(nav.next(), Err(TransitionRejected::NotChecked));
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn next_on_last_question_ends_exactly_once() {
        let mut nav = started(SessionKind::BookmarkReview, 2);
        nav.check().unwrap();
        assert_eq!(nav.next(), Ok(Advance::Moved { index: 1 }));
        nav.check().unwrap();

        assert_eq!(
            nav.next(),
            Ok(Advance::Ended {
                destination: ExitDestination::BookmarkList
            })
        );
        assert_eq!(nav.phase(), Phase::Ended(EndReason::Completed));
        assert_eq!(nav.next(), Err(TransitionRejected::NotActive));
        assert_eq!(nav.previous(), Err(TransitionRejected::NotActive));
        assert_eq!(nav.select_option("A"), Err(TransitionRejected::NotActive));
        assert_eq!(nav.phase(), Phase::Ended(EndReason::Completed));
    }

    #[test]
    fn previous_then_next_restores_state() {
        let mut nav = started(SessionKind::FreeQuiz, 3);
        select_all(&mut nav, &["B", "A"]);
        nav.check().unwrap();
        let first = nav.current_state().clone();
        nav.next().unwrap();

        select_all(&mut nav, &["C"]);
        nav.check().unwrap();
        let second = nav.current_state().clone();

        assert_eq!(nav.previous(), Ok(0));
        assert_eq!(nav.current_state(), &first);
        nav.next().unwrap();
        assert_eq!(nav.current_state(), &second);
        assert_eq!(nav.current_index(), 1);
    }

    #[test]
    fn previous_discards_unchecked_selections() {
        let mut nav = started(SessionKind::FreeQuiz, 2);
        nav.check().unwrap();
        nav.next().unwrap();
        nav.select_option("A").unwrap();

        nav.previous().unwrap();
        nav.next().unwrap();
        assert_eq!(nav.current_state(), &AnswerState::default());
    }

    #[test]
    fn previous_is_rejected_on_first_question_and_in_exams() {
        let mut nav = started(SessionKind::FreeQuiz, 2);
        assert_eq!(nav.previous(), Err(TransitionRejected::AtFirstQuestion));

        let mut exam = started(SessionKind::Exam, 2);
        exam.exam_next().unwrap();
        assert_eq!(exam.previous(), Err(TransitionRejected::ExamMode));
        assert_eq!(exam.check(), Err(TransitionRejected::ExamMode));
        assert_eq!(exam.next(), Err(TransitionRejected::ExamMode));
    }

    #[test]
    fn reveal_all_applies_to_newly_visited_questions() {
        let mut nav = started(SessionKind::FreeQuiz, 3);
        nav.set_reveal_all(true);
        assert!(!nav.current_state().checked);
        nav.check().unwrap();

        nav.next().unwrap();
        assert!(nav.current_state().checked);
        assert_eq!(nav.current_state().correct, None);
        assert_eq!(nav.select_option("A"), Err(TransitionRejected::AlreadyChecked));

        nav.set_reveal_all(false);
        nav.previous().unwrap();
        assert_eq!(nav.current_state().correct, Some(false));
        nav.next().unwrap();
        assert!(nav.current_state().checked);
        nav.next().unwrap();
        assert!(!nav.current_state().checked);

        // Revealed questions are not graded.
        assert_eq!(nav.score().total_answered(), 1);
    }

    #[test]
    fn reveal_all_setting_prechecks_first_question() {
        let settings = SessionSettings::default().with_reveal_all_answers(true);
        let mut nav = Navigator::new(SessionKind::FreeQuiz, vec![abc("q")], &settings);
        nav.begin();
        assert!(nav.current_state().checked);
    }

    #[test]
    fn empty_working_set_is_terminal() {
        let mut nav = Navigator::new(SessionKind::Exam, Vec::new(), &SessionSettings::default());
        assert_eq!(nav.phase(), Phase::Loading);
        assert_eq!(nav.begin(), Phase::Empty);

        assert_eq!(nav.select_option("A"), Err(TransitionRejected::NotActive));
        assert_eq!(nav.exam_next(), Err(TransitionRejected::NotActive));
        assert_eq!(nav.tick(), TimerTick::Inactive);
        assert!(!nav.end(EndReason::Exited));
        assert!(nav.current_question().is_none());
        assert!(nav.score().score_percent().is_none());
    }

    #[test]
    fn transitions_before_begin_are_rejected() {
        let mut nav =
            Navigator::new(SessionKind::FreeQuiz, vec![abc("q")], &SessionSettings::default());
        assert_eq!(nav.check(), Err(TransitionRejected::NotActive));
        assert_eq!(nav.begin(), Phase::Active);
        assert_eq!(nav.begin(), Phase::Active);
    }

    #[test]
    fn exam_next_records_selections_and_ends_on_exhaustion() {
        let mut nav = started(SessionKind::Exam, 3);
        assert_eq!(nav.check(), Err(TransitionRejected::ExamMode));

        select_all(&mut nav, &["A", "B"]);
        assert_eq!(nav.exam_next(), Ok(Advance::Moved { index: 1 }));
        assert!(nav.current_state().selection.is_empty());
        assert_eq!(nav.exam_next(), Ok(Advance::Moved { index: 2 }));
        select_all(&mut nav, &["A"]);
        assert_eq!(
            nav.exam_next(),
            Ok(Advance::Ended {
                destination: ExitDestination::ExamResult
            })
        );

        assert_eq!(nav.attempted(), 3);
        assert_eq!(nav.phase(), Phase::Ended(EndReason::Completed));
        assert!(nav.exam_records()[1].user_answers.is_empty());
        let score = nav.score();
        assert_eq!(score.correct_count(), 1);
        assert_eq!(score.wrong_count(), 2);
        assert_eq!(nav.exam_next(), Err(TransitionRejected::NotActive));
    }

    #[test]
    fn exam_next_is_rejected_outside_exams() {
        let mut nav = started(SessionKind::FreeQuiz, 1);
        assert_eq!(nav.exam_next(), Err(TransitionRejected::NotExam));
    }

    #[test]
    fn timer_expiry_ends_exam_and_ignores_later_ticks() {
        let settings = SessionSettings::new(30, 60, 1000, 100, false).unwrap();
        let mut nav = Navigator::new(SessionKind::Exam, vec![abc("a"), abc("b")], &settings);
        nav.begin();
        for _ in 0..59 {
            assert!(matches!(nav.tick(), TimerTick::Running { .. }));
        }
        assert_eq!(nav.remaining_secs(), Some(1));
        assert_eq!(nav.clock_label().as_deref(), Some("00:01"));

        assert_eq!(nav.tick(), TimerTick::TimedOut);
        assert_eq!(nav.phase(), Phase::Ended(EndReason::TimedOut));
        assert_eq!(nav.remaining_secs(), Some(0));

        assert_eq!(nav.tick(), TimerTick::Inactive);
        assert_eq!(nav.remaining_secs(), Some(0));
        assert_eq!(nav.exam_next(), Err(TransitionRejected::NotActive));
    }

    #[test]
    fn ticks_are_ignored_outside_exams() {
        let mut nav = started(SessionKind::CategoryReview, 1);
        assert_eq!(nav.tick(), TimerTick::Inactive);
        assert_eq!(nav.remaining_secs(), None);
    }

    #[test]
    fn end_is_idempotent() {
        let mut nav = started(SessionKind::FreeQuiz, 2);
        assert!(nav.end(EndReason::Exited));
        assert!(!nav.end(EndReason::Completed));
        assert_eq!(nav.phase(), Phase::Ended(EndReason::Exited));
    }

    #[test]
    fn ten_exam_records_with_seven_correct_score_seventy() {
        let mut nav = started(SessionKind::Exam, 10);
        for i in 0..10 {
            if i < 7 {
                select_all(&mut nav, &["A", "B"]);
            } else {
                select_all(&mut nav, &["C"]);
            }
            nav.exam_next().unwrap();
        }

        let score = nav.score();
        assert_eq!(score.score_percent(), Some(70.0));
        assert_eq!(score.correct_list().len(), 7);
        assert_eq!(score.wrong_list().len(), 3);
    }

    #[test]
    fn review_score_counts_checked_questions_only() {
        let mut nav = started(SessionKind::FreeQuiz, 3);
        select_all(&mut nav, &["A", "B"]);
        nav.check().unwrap();
        nav.next().unwrap();
        select_all(&mut nav, &["A"]);
        nav.check().unwrap();
        nav.next().unwrap();

        let score = nav.score();
        assert_eq!(score.total_answered(), 2);
        assert_eq!(score.score_percent(), Some(50.0));
        assert_eq!(score.wrong_list()[0].user_answers, vec!["A".to_string()]);
    }
}
