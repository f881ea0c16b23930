//! Value-based grading shared by the navigator and the result partitioner.

use std::collections::HashSet;

/// Ordered set of option values selected for one question.
///
/// Insertion order is kept for display; grading ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from values, dropping duplicates.
    #[must_use]
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for value in values {
            let value = value.into();
            if !selection.contains(&value) {
                selection.0.push(value);
            }
        }
        selection
    }

    /// Add `value` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, value: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|v| v == value) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(value.to_string());
            true
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
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
    pub fn into_values(self) -> Vec<String> {
        self.0
    }
}

/// Exact set equality between selected values and the correct set.
///
/// Both directions must hold: a subset or a superset of the correct answers is
/// wrong. Option order never matters.
#[must_use]
pub fn is_all_correct<S: AsRef<str>>(selected: &[S], correct: &[S]) -> bool {
    let selected: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    let correct: HashSet<&str> = correct.iter().map(AsRef::as_ref).collect();
    selected.len() == correct.len() && selected.iter().all(|v| correct.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_correct() {
        assert!(is_all_correct(&["A", "B"], &["A", "B"]));
        assert!(is_all_correct(&["B", "A"], &["A", "B"]));
    }

    #[test]
    fn subset_and_superset_are_wrong() {
        assert!(!is_all_correct(&["A"], &["A", "B"]));
        assert!(!is_all_correct(&["A", "B", "C"], &["A", "B"]));
        assert!(!is_all_correct(&[], &["A"]));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = Selection::new();
        assert!(selection.toggle("A"));
        assert!(selection.toggle("B"));
        assert!(!selection.toggle("A"));
        assert_eq!(selection.values(), &["B".to_string()]);
    }

    #[test]
    fn from_values_drops_duplicates() {
        let selection = Selection::from_values(["A", "A", "C"]);
        assert_eq!(selection.len(), 2);
    }
}
