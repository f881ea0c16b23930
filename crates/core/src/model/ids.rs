use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ─── String Keys ───────────────────────────────────────────────────────────────

/// Stable external key of a catalog question (e.g. `"1.1.01-001"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionNumber(String);

impl QuestionNumber {
    /// Creates a `QuestionNumber` from a trimmed, non-empty string.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the value is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        non_blank(raw.into(), "QuestionNumber").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-text category label, conventionally prefixed by its group (`"GW 1.1"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryKey(String);

impl CategoryKey {
    /// Creates a `CategoryKey` from a trimmed, non-empty label.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the label is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        non_blank(raw.into(), "CategoryKey").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Top-level group of this category: the leading run of ASCII letters.
    ///
    /// Returns `None` when the label does not start with a letter.
    #[must_use]
    pub fn group(&self) -> Option<GroupTag> {
        let end = self
            .0
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphabetic())
            .map_or(self.0.len(), |(i, _)| i);
        if end == 0 {
            return None;
        }
        Some(GroupTag(self.0[..end].to_ascii_uppercase()))
    }
}

/// Top-level syllabus section used to guarantee exam coverage (e.g. `GW`, `B`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupTag(String);

impl GroupTag {
    /// Creates a `GroupTag`; tags are compared case-insensitively, so they are
    /// stored upper-cased.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the tag is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        non_blank(raw.into(), "GroupTag").map(|s| Self(s.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity of the learner that owns progress and bookmarks.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserEmail(String);

impl UserEmail {
    /// Creates a `UserEmail`. Only a minimal shape check is applied; the
    /// authentication provider owns the real validation.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the value is blank or has no `@`.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        let value = non_blank(raw.into(), "UserEmail")?;
        if !value.contains('@') {
            return Err(ParseIdError { kind: "UserEmail" });
        }
        Ok(Self(value.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier of one running quiz/exam session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

fn non_blank(raw: String, kind: &'static str) -> Result<String, ParseIdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseIdError { kind });
    }
    Ok(trimmed.to_string())
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

macro_rules! string_key_fmt {
    ($($ty:ident),*) => {
        $(
            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({:?})", stringify!($ty), self.0)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl FromStr for $ty {
                type Err = ParseIdError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                }
            }
        )*
    };
}

string_key_fmt!(QuestionNumber, CategoryKey, GroupTag, UserEmail);

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a key from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_number_is_trimmed() {
        let id: QuestionNumber = "  1.1.01-001 ".parse().unwrap();
        assert_eq!(id.as_str(), "1.1.01-001");
        assert_eq!(id.to_string(), "1.1.01-001");
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert!(QuestionNumber::new("   ").is_err());
        assert!(CategoryKey::new("").is_err());
        assert!(GroupTag::new(" ").is_err());
    }

    #[test]
    fn category_group_is_leading_letters() {
        let gw = CategoryKey::new("GW 1.1 Verkehrszeichen").unwrap();
        assert_eq!(gw.group(), Some(GroupTag::new("GW").unwrap()));

        let b = CategoryKey::new("B-2.3").unwrap();
        assert_eq!(b.group(), Some(GroupTag::new("b").unwrap()));

        let bare = CategoryKey::new("GW").unwrap();
        assert_eq!(bare.group().unwrap().as_str(), "GW");
    }

    #[test]
    fn category_without_letter_prefix_has_no_group() {
        let key = CategoryKey::new("2.1.03").unwrap();
        assert_eq!(key.group(), None);
    }

    #[test]
    fn user_email_requires_at_sign_and_is_lowercased() {
        assert!(UserEmail::new("learner").is_err());
        let email = UserEmail::new("Learner@Example.org").unwrap();
        assert_eq!(email.as_str(), "learner@example.org");
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
