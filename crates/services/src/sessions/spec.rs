use quiz_core::model::{CategoryKey, GroupTag, Question, SessionKind};

/// Loose session-entry parameters as handed over by a calling layer.
///
/// At most one selector is expected to be set; [`SessionParams::resolve`]
/// turns them into a [`SessionSpec`].
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    pub exam_groups: Option<Vec<String>>,
    pub category: Option<String>,
    pub bookmarked_questions: Option<Vec<Question>>,
}

impl SessionParams {
    #[must_use]
    pub fn exam<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exam_groups: Some(groups.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bookmarks(questions: Vec<Question>) -> Self {
        Self {
            bookmarked_questions: Some(questions),
            ..Self::default()
        }
    }

    /// Resolve into a tagged spec.
    ///
    /// Conflicting selectors, an exam without any usable group, or a blank
    /// category fall back to [`SessionSpec::FreeQuiz`] with a warning.
    #[must_use]
    pub fn resolve(self) -> SessionSpec {
        let selectors = usize::from(self.exam_groups.is_some())
            + usize::from(self.category.is_some())
            + usize::from(self.bookmarked_questions.is_some());
        if selectors > 1 {
            log::warn!("conflicting session parameters; starting a free quiz");
            return SessionSpec::FreeQuiz;
        }

        if let Some(raw_groups) = self.exam_groups {
            let mut groups: Vec<GroupTag> = Vec::new();
            for raw in raw_groups {
                match GroupTag::new(raw) {
                    Ok(tag) if !groups.contains(&tag) => groups.push(tag),
                    Ok(_) => {}
                    Err(err) => log::warn!("ignoring exam group: {err}"),
                }
            }
            if groups.is_empty() {
                log::warn!("exam requested without groups; starting a free quiz");
                return SessionSpec::FreeQuiz;
            }
            return SessionSpec::Exam { groups };
        }

        if let Some(raw) = self.category {
            return match CategoryKey::new(raw) {
                Ok(category) => SessionSpec::CategoryReview { category },
                Err(err) => {
                    log::warn!("invalid review category ({err}); starting a free quiz");
                    SessionSpec::FreeQuiz
                }
            };
        }

        if let Some(questions) = self.bookmarked_questions {
            return SessionSpec::BookmarkReview { questions };
        }

        SessionSpec::FreeQuiz
    }
}

/// Mode of a session, resolved once at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSpec {
    Exam { groups: Vec<GroupTag> },
    CategoryReview { category: CategoryKey },
    BookmarkReview { questions: Vec<Question> },
    FreeQuiz,
}

impl SessionSpec {
    #[must_use]
    pub fn kind(&self) -> SessionKind {
        match self {
            SessionSpec::Exam { .. } => SessionKind::Exam,
            SessionSpec::CategoryReview { .. } => SessionKind::CategoryReview,
            SessionSpec::BookmarkReview { .. } => SessionKind::BookmarkReview,
            SessionSpec::FreeQuiz => SessionKind::FreeQuiz,
        }
    }

    #[must_use]
    pub fn category(&self) -> Option<&CategoryKey> {
        match self {
            SessionSpec::CategoryReview { category } => Some(category),
            _ => None,
        }
    }
}

/// Where the caller should navigate once a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDestination {
    CategoryList,
    BookmarkList,
    Home,
    ExamResult,
}

impl ExitDestination {
    #[must_use]
    pub fn for_kind(kind: SessionKind) -> Self {
        match kind {
            SessionKind::CategoryReview => ExitDestination::CategoryList,
            SessionKind::BookmarkReview => ExitDestination::BookmarkList,
            SessionKind::FreeQuiz => ExitDestination::Home,
            SessionKind::Exam => ExitDestination::ExamResult,
        }
    }
}
