mod ids;
pub mod media;
mod progress;
mod question;
mod score;
mod session;
mod working;

pub use ids::{CategoryKey, GroupTag, ParseIdError, QuestionNumber, SessionId, UserEmail};
pub use media::{MediaUri, MediaValidationError};
pub use progress::{Attempt, BookmarkToggle, CategoryCompletion, ProgressRecord};
pub use question::{Question, QuestionError, RawKey, RawQuestionRecord};
pub use score::{ExamAnswerRecord, GradedAnswer, ScoreResult};
pub use session::{SessionKind, SessionSummary, SessionSummaryError};
pub use working::{AnswerPermutation, PermutationError, WorkingQuestion};
