use std::collections::HashMap;
use thiserror::Error;

use crate::grading::is_all_correct;
use crate::model::ids::{CategoryKey, QuestionNumber};
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("permutation has {got} entries, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("index {0} is out of range or repeated")]
    InvalidIndex(usize),
}

//
// ─── PERMUTATION ───────────────────────────────────────────────────────────────
//

/// A validated permutation of `0..n`.
///
/// Entry `i` is the original position of the option shown at position `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPermutation(Vec<usize>);

impl AnswerPermutation {
    /// # Errors
    ///
    /// Returns `PermutationError::InvalidIndex` if `order` is not a permutation
    /// of `0..order.len()`.
    pub fn new(order: Vec<usize>) -> Result<Self, PermutationError> {
        let mut seen = vec![false; order.len()];
        for &index in &order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(PermutationError::InvalidIndex(index)),
            }
        }
        Ok(Self(order))
    }

    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

//
// ─── WORKING QUESTION ──────────────────────────────────────────────────────────
//

/// Per-session copy of a `Question` with its options shown in shuffled order.
///
/// The remap (`original_answer_mapping`) is kept for introspection; grading is
/// done by value and never consults it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingQuestion {
    question: Question,
    permutation: AnswerPermutation,
    original_answer_mapping: HashMap<String, usize>,
}

impl WorkingQuestion {
    /// Apply `permutation` to both parallel option arrays of `question`.
    ///
    /// # Errors
    ///
    /// Returns `PermutationError::LengthMismatch` if the permutation does not
    /// cover exactly the question's options.
    pub fn permuted(
        question: &Question,
        permutation: AnswerPermutation,
    ) -> Result<Self, PermutationError> {
        let expected = question.answers().len();
        if permutation.len() != expected {
            return Err(PermutationError::LengthMismatch {
                expected,
                got: permutation.len(),
            });
        }

        let order = permutation.as_slice();
        let answers: Vec<String> = order
            .iter()
            .map(|&i| question.answers()[i].clone())
            .collect();
        let translated: Vec<String> = order
            .iter()
            .map(|&i| question.translated_answers()[i].clone())
            .collect();
        let original_answer_mapping = answers
            .iter()
            .enumerate()
            .map(|(new_index, value)| (value.clone(), new_index))
            .collect();

        Ok(Self {
            question: question.with_reordered_answers(answers, translated),
            permutation,
            original_answer_mapping,
        })
    }

    /// Wrap a question without reordering its options.
    #[must_use]
    pub fn unshuffled(question: &Question) -> Self {
        let len = question.answers().len();
        let original_answer_mapping = question
            .answers()
            .iter()
            .enumerate()
            .map(|(i, value)| (value.clone(), i))
            .collect();
        Self {
            question: question.clone(),
            permutation: AnswerPermutation::identity(len),
            original_answer_mapping,
        }
    }

    /// The question as shown: options in shuffled order.
    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn number(&self) -> &QuestionNumber {
        self.question.number()
    }

    #[must_use]
    pub fn category(&self) -> &CategoryKey {
        self.question.category()
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        self.question.answers()
    }

    #[must_use]
    pub fn translated_answers(&self) -> &[String] {
        self.question.translated_answers()
    }

    #[must_use]
    pub fn correct_answers(&self) -> &[String] {
        self.question.correct_answers()
    }

    /// Option value → position in the shuffled arrays.
    #[must_use]
    pub fn original_answer_mapping(&self) -> &HashMap<String, usize> {
        &self.original_answer_mapping
    }

    #[must_use]
    pub fn permutation(&self) -> &AnswerPermutation {
        &self.permutation
    }

    /// Original position of the option currently shown at `shown_index`.
    #[must_use]
    pub fn original_index(&self, shown_index: usize) -> Option<usize> {
        self.permutation.as_slice().get(shown_index).copied()
    }

    /// Grade `selected` against the correct set by value.
    #[must_use]
    pub fn is_all_correct(&self, selected: &[String]) -> bool {
        is_all_correct(selected, self.question.correct_answers())
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

    fn question() -> Question {
        Question::new(
            QuestionNumber::new("2.2.03-102").unwrap(),
            "Which signs apply?",
            "",
            strings(&["A", "B", "C", "D"]),
            strings(&["a", "b", "c", "d"]),
            strings(&["A", "C"]),
            CategoryKey::new("GW 2.2").unwrap(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn permutation_rejects_repeats_and_out_of_range() {
        assert_eq!(
            AnswerPermutation::new(vec![0, 0]),
            Err(PermutationError::InvalidIndex(0))
        );
        assert_eq!(
            AnswerPermutation::new(vec![0, 2]),
            Err(PermutationError::InvalidIndex(2))
        );
    }

    #[test]
    fn permuted_keeps_parallel_arrays_aligned() {
        let q = question();
        let perm = AnswerPermutation::new(vec![2, 0, 3, 1]).unwrap();
        let working = WorkingQuestion::permuted(&q, perm).unwrap();

        assert_eq!(working.answers(), &strings(&["C", "A", "D", "B"])[..]);
        assert_eq!(working.translated_answers(), &strings(&["c", "a", "d", "b"])[..]);
        for (i, value) in working.answers().iter().enumerate() {
            let original = working.original_index(i).unwrap();
            assert_eq!(&q.answers()[original], value);
            assert_eq!(q.translated_answers()[original], working.translated_answers()[i]);
        }
    }

    #[test]
    fn mapping_is_a_bijection_over_values() {
        let q = question();
        let perm = AnswerPermutation::new(vec![3, 2, 1, 0]).unwrap();
        let working = WorkingQuestion::permuted(&q, perm).unwrap();
        let mapping = working.original_answer_mapping();

        assert_eq!(mapping.len(), q.answers().len());
        for (value, &index) in mapping {
            assert_eq!(&working.answers()[index], value);
        }
    }

    #[test]
    fn permutation_length_must_match_options() {
        let err =
            WorkingQuestion::permuted(&question(), AnswerPermutation::identity(3)).unwrap_err();
        assert_eq!(err, PermutationError::LengthMismatch { expected: 4, got: 3 });
    }

    #[test]
    fn grading_ignores_option_order() {
        let q = question();
        let shown = WorkingQuestion::permuted(&q, AnswerPermutation::new(vec![1, 3, 0, 2]).unwrap())
            .unwrap();
        let plain = WorkingQuestion::unshuffled(&q);

        for selected in [strings(&["A", "C"]), strings(&["C"]), strings(&["A", "B", "C"])] {
            assert_eq!(shown.is_all_correct(&selected), plain.is_all_correct(&selected));
        }
        assert!(shown.is_all_correct(&strings(&["C", "A"])));
    }
}
