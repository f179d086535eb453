pub mod demo;
pub mod generation;
pub mod question;
pub mod quiz_session;
pub mod result_summary;
pub mod test_editor;
pub mod tier;
pub mod user_stats;

pub use generation::{GenerationModel, GenerationRequest, TextType};
pub use question::{Answer, Question, validate_questions};
pub use quiz_session::{QuizSession, QuizState, Transition};
pub use result_summary::{QuestionResult, ResultSummary};
pub use stored_test::StoredTest;
pub use test_editor::TestEditor;
pub use tier::Tier;
pub use user_stats::UserStats;
