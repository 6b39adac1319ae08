use std::sync::Arc;

use crate::domain::Question;
use crate::error::AppError;
use crate::repository::{AnswerRepository, QuestionRepository};
use crate::validators::{is_valid_text, MAX_TEXT_LENGTH, MIN_QUESTION_LENGTH};

pub struct QuestionService {
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl QuestionService {
    pub fn new(questions: Arc<dyn QuestionRepository>, answers: Arc<dyn AnswerRepository>) -> Self {
        Self { questions, answers }
    }

    pub async fn create(&self, text: &str) -> Result<Question, AppError> {
        let text = is_valid_text("text", text, MIN_QUESTION_LENGTH, MAX_TEXT_LENGTH)?;
        let question = self.questions.insert_question(&text).await?;

        tracing::info!(question_id = question.id, "Question created");
        Ok(question)
    }

    /// Fetch a question together with its answers.
    pub async fn get(&self, id: i64) -> Result<Question, AppError> {
        let mut question = self
            .questions
            .find_question(id)
            .await?
            .ok_or_else(|| AppError::NotFound("question".to_string()))?;

        question.answers = self.answers.list_answers(id).await?;
        Ok(question)
    }

    pub async fn list(&self) -> Result<Vec<Question>, AppError> {
        Ok(self.questions.list_questions().await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.questions.delete_question(id).await? {
            return Err(AppError::NotFound("question".to_string()));
        }

        tracing::info!(question_id = id, "Question deleted");
        Ok(())
    }
}
