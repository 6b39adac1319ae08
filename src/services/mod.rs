/// Q/A services
///
/// Validation and not-found handling over the question and answer stores.

mod answers;
mod questions;

pub use answers::AnswerService;
pub use questions::QuestionService;
