use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashSet;

use quiz_core::model::{
    AnswerPermutation, CategoryKey, GroupTag, Question, QuestionNumber, SessionKind,
    WorkingQuestion,
};

use super::spec::SessionSpec;

/// Default number of questions in an exam.
pub const DEFAULT_EXAM_TARGET: usize = 30;

//
// ─── CATALOG SNAPSHOT ──────────────────────────────────────────────────────────
//

/// Session-scoped view of the question catalog handed to the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    questions: Vec<Question>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions grouped by category, categories in first-appearance order.
    #[must_use]
    pub fn partition_by_category(&self) -> Vec<(&CategoryKey, Vec<&Question>)> {
        let mut out: Vec<(&CategoryKey, Vec<&Question>)> = Vec::new();
        for question in &self.questions {
            match out.iter_mut().find(|(key, _)| *key == question.category()) {
                Some((_, list)) => list.push(question),
                None => out.push((question.category(), vec![question])),
            }
        }
        out
    }
}

//
// ─── SESSION PLAN ──────────────────────────────────────────────────────────────
//

/// Working set produced for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub kind: SessionKind,
    pub questions: Vec<WorkingQuestion>,
    /// Exam only: questions picked one per category.
    pub category_picks: usize,
    /// Exam only: questions appended from the shuffled remaining pool.
    pub fill_picks: usize,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

//
// ─── BUILDER ───────────────────────────────────────────────────────────────────
//

/// Builds the working set for a [`SessionSpec`] from a catalog snapshot.
pub struct SessionBuilder<'a> {
    snapshot: &'a CatalogSnapshot,
    exam_target: usize,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(snapshot: &'a CatalogSnapshot) -> Self {
        Self {
            snapshot,
            exam_target: DEFAULT_EXAM_TARGET,
        }
    }

    #[must_use]
    pub fn with_exam_target(mut self, target: usize) -> Self {
        self.exam_target = target;
        self
    }

    pub fn build<R: Rng + ?Sized>(self, spec: &SessionSpec, rng: &mut R) -> SessionPlan {
        match spec {
            SessionSpec::Exam { groups } => self.build_exam(groups, rng),
            SessionSpec::CategoryReview { category } => {
                let mut picked: Vec<&Question> = self
                    .snapshot
                    .questions()
                    .iter()
                    .filter(|q| q.category() == category)
                    .collect();
                picked.shuffle(rng);
                plan(SessionKind::CategoryReview, shuffle_all(picked, rng))
            }
            SessionSpec::BookmarkReview { questions } => plan(
                SessionKind::BookmarkReview,
                shuffle_all(questions.iter(), rng),
            ),
            SessionSpec::FreeQuiz => plan(
                SessionKind::FreeQuiz,
                shuffle_all(self.snapshot.questions().iter(), rng),
            ),
        }
    }

    /// One random question per selected category first, then a random fill
    /// from the rest of the selected groups up to the exam target.
    fn build_exam<R: Rng + ?Sized>(&self, groups: &[GroupTag], rng: &mut R) -> SessionPlan {
        let in_groups = |key: &CategoryKey| key.group().is_some_and(|g| groups.contains(&g));

        let mut picks: Vec<&Question> = Vec::new();
        for (key, questions) in self.snapshot.partition_by_category() {
            if !in_groups(key) {
                continue;
            }
            if let Some(question) = questions.choose(rng).copied() {
                picks.push(question);
            }
        }
        let category_picks = picks.len();

        let shortfall = self.exam_target.saturating_sub(picks.len());
        let mut fill_picks = 0;
        if shortfall > 0 {
            let picked: HashSet<&QuestionNumber> = picks.iter().map(|q| q.number()).collect();
            let mut pool: Vec<&Question> = self
                .snapshot
                .questions()
                .iter()
                .filter(|q| in_groups(q.category()) && !picked.contains(q.number()))
                .collect();
            pool.shuffle(rng);
            pool.truncate(shortfall);
            fill_picks = pool.len();
            picks.extend(pool);
        }

        SessionPlan {
            kind: SessionKind::Exam,
            questions: shuffle_all(picks, rng),
            category_picks,
            fill_picks,
        }
    }
}

fn plan(kind: SessionKind, questions: Vec<WorkingQuestion>) -> SessionPlan {
    SessionPlan {
        kind,
        questions,
        category_picks: 0,
        fill_picks: 0,
    }
}

fn shuffle_all<'q, R: Rng + ?Sized>(
    questions: impl IntoIterator<Item = &'q Question>,
    rng: &mut R,
) -> Vec<WorkingQuestion> {
    questions
        .into_iter()
        .map(|q| shuffle_answers(q, rng))
        .collect()
}

/// Shuffle the answer options of `question`, keeping both option arrays aligned.
pub fn shuffle_answers<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> WorkingQuestion {
    let mut order: Vec<usize> = (0..question.answers().len()).collect();
    order.shuffle(rng);
    match AnswerPermutation::new(order).and_then(|p| WorkingQuestion::permuted(question, p)) {
        Ok(working) => working,
        Err(err) => {
            log::warn!(
                "keeping answer order of question {}: {err}",
                question.number()
            );
            WorkingQuestion::unshuffled(question)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::grading::is_all_correct;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(number: &str, category: &str) -> Question {
        Question::new(
            QuestionNumber::new(number).unwrap(),
            format!("Question {number}"),
            "",
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec!["A".into(), "C".into()],
            CategoryKey::new(category).unwrap(),
            None,
        )
        .unwrap()
    }

    fn numbers(plan: &SessionPlan) -> Vec<&str> {
        plan.questions.iter().map(|q| q.number().as_str()).collect()
    }

    fn groups(tags: &[&str]) -> Vec<GroupTag> {
        tags.iter().map(|t| GroupTag::new(*t).unwrap()).collect()
    }

    #[test]
    fn exam_picks_one_per_category_then_fills() {
        let snapshot = CatalogSnapshot::new(vec![
            question("q1", "A 1"),
            question("q2", "A 1"),
            question("q3", "B 1"),
        ]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = SessionBuilder::new(&snapshot).build(
                &SessionSpec::Exam {
                    groups: groups(&["A", "B"]),
                },
                &mut rng,
            );

            let got = numbers(&plan);
            assert_eq!(got.len(), 3);
            assert!(got[0] == "q1" || got[0] == "q2");
            assert_eq!(got[1], "q3");
            assert!(got[2] == "q1" || got[2] == "q2");
            assert_ne!(got[0], got[2]);
            assert_eq!(plan.category_picks, 2);
            assert_eq!(plan.fill_picks, 1);
        }
    }

    #[test]
    fn exam_covers_every_selected_category_and_respects_target() {
        let mut questions = Vec::new();
        for cat in 0..5 {
            for n in 0..10 {
                questions.push(question(&format!("gw-{cat}-{n}"), &format!("GW {cat}")));
            }
        }
        for n in 0..10 {
            questions.push(question(&format!("b-{n}"), "B 1"));
        }
        let snapshot = CatalogSnapshot::new(questions);
        let mut rng = StdRng::seed_from_u64(7);

        let plan = SessionBuilder::new(&snapshot).with_exam_target(12).build(
            &SessionSpec::Exam {
                groups: groups(&["GW"]),
            },
            &mut rng,
        );

        assert_eq!(plan.total(), 12);
        assert_eq!(plan.category_picks, 5);
        for cat in 0..5 {
            let key = format!("GW {cat}");
            assert!(plan.questions.iter().any(|q| q.category().as_str() == key));
        }
        assert!(plan.questions.iter().all(|q| !q.number().as_str().starts_with('b')));
        let unique: HashSet<_> = plan.questions.iter().map(|q| q.number().clone()).collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn exam_skips_categories_without_group() {
        let snapshot = CatalogSnapshot::new(vec![question("1", "1.1"), question("2", "GW 1")]);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SessionBuilder::new(&snapshot).build(
            &SessionSpec::Exam {
                groups: groups(&["GW"]),
            },
            &mut rng,
        );
        assert_eq!(numbers(&plan), vec!["2"]);
    }

    #[test]
    fn category_review_is_a_permutation_of_the_category() {
        let mut questions: Vec<Question> =
            (0..5).map(|n| question(&format!("c{n}"), "GW 2")).collect();
        questions.push(question("other", "B 1"));
        let snapshot = CatalogSnapshot::new(questions);
        let mut rng = StdRng::seed_from_u64(3);

        let plan = SessionBuilder::new(&snapshot).build(
            &SessionSpec::CategoryReview {
                category: CategoryKey::new("GW 2").unwrap(),
            },
            &mut rng,
        );

        let mut got = numbers(&plan);
        got.sort_unstable();
        assert_eq!(got, vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn bookmark_and_free_modes_preserve_order() {
        let list = vec![question("z", "B 1"), question("a", "GW 1"), question("m", "B 1")];
        let snapshot = CatalogSnapshot::new(list.clone());
        let mut rng = StdRng::seed_from_u64(11);

        let bookmarks = SessionBuilder::new(&CatalogSnapshot::default()).build(
            &SessionSpec::BookmarkReview { questions: list },
            &mut rng,
        );
        assert_eq!(numbers(&bookmarks), vec!["z", "a", "m"]);

        let free = SessionBuilder::new(&snapshot).build(&SessionSpec::FreeQuiz, &mut rng);
        assert_eq!(numbers(&free), vec!["z", "a", "m"]);
    }

    #[test]
    fn empty_inputs_give_empty_plans() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = CatalogSnapshot::default();
        assert!(
            SessionBuilder::new(&empty)
                .build(
                    &SessionSpec::CategoryReview {
                        category: CategoryKey::new("GW 1").unwrap()
                    },
                    &mut rng
                )
                .is_empty()
        );
        assert!(
            SessionBuilder::new(&empty)
                .build(&SessionSpec::BookmarkReview { questions: vec![] }, &mut rng)
                .is_empty()
        );
        assert!(
            SessionBuilder::new(&empty)
                .build(&SessionSpec::Exam { groups: groups(&["GW"]) }, &mut rng)
                .is_empty()
        );
    }

    #[test]
    fn answer_shuffle_keeps_options_aligned_and_grading_stable() {
        let original = Question::new(
            QuestionNumber::new("p").unwrap(),
            "Which?",
            "",
            vec!["Brake".into(), "Honk".into(), "Stop".into(), "Wait".into()],
            vec!["bremsen".into(), "hupen".into(), "halten".into(), "warten".into()],
            vec!["Brake".into(), "Stop".into()],
            CategoryKey::new("GW 1").unwrap(),
            None,
        )
        .unwrap();
        let selected = vec!["Stop".to_string(), "Brake".to_string()];

        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let working = shuffle_answers(&original, &mut rng);

            assert_eq!(working.answers().len(), working.translated_answers().len());
            let mut values = working.answers().to_vec();
            values.sort();
            let mut expected = original.answers().to_vec();
            expected.sort();
            assert_eq!(values, expected);

            for (shown, value) in working.answers().iter().enumerate() {
                let source = working.original_index(shown).unwrap();
                assert_eq!(original.answers()[source], *value);
                assert_eq!(
                    original.translated_answers()[source],
                    working.translated_answers()[shown]
                );
                assert_eq!(working.original_answer_mapping()[value], shown);
            }

            assert_eq!(
                working.is_all_correct(&selected),
                is_all_correct(selected.as_slice(), original.correct_answers())
            );
        }
    }
}
