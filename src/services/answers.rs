use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::domain::Answer;
use crate::error::{AppError, DatabaseError};
use crate::repository::{AnswerRepository, QuestionRepository};
use crate::validators::{is_valid_text, MAX_TEXT_LENGTH, MIN_ANSWER_LENGTH};

pub struct AnswerService {
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl AnswerService {
    pub fn new(questions: Arc<dyn QuestionRepository>, answers: Arc<dyn AnswerRepository>) -> Self {
        Self { questions, answers }
    }

    /// Answer a question as `author`. The author always comes from the
    /// verified access token.
    pub async fn create(
        &self,
        question_id: i64,
        author: &AuthenticatedUser,
        text: &str,
    ) -> Result<Answer, AppError> {
        let text = is_valid_text("text", text, MIN_ANSWER_LENGTH, MAX_TEXT_LENGTH)?;

        if self.questions.find_question(question_id).await?.is_none() {
            return Err(AppError::NotFound("question".to_string()));
        }

        // The question may be deleted between the check and the insert.
        let answer = self
            .answers
            .insert_answer(question_id, &author.user_id, &text)
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKeyViolation(_) => AppError::NotFound("question".to_string()),
                other => other.into(),
            })?;

        tracing::info!(
            answer_id = answer.id,
            question_id = question_id,
            user_id = %author.user_id,
            "Answer created"
        );
        Ok(answer)
    }

    pub async fn get(&self, id: i64) -> Result<Answer, AppError> {
        self.answers
            .find_answer(id)
            .await?
            .ok_or_else(|| AppError::NotFound("answer".to_string()))
    }

    /// Any authenticated user may delete an answer.
    pub async fn delete(&self, id: i64, caller: &AuthenticatedUser) -> Result<(), AppError> {
        if !self.answers.delete_answer(id).await? {
            return Err(AppError::NotFound("answer".to_string()));
        }

        tracing::info!(answer_id = id, user_id = %caller.user_id, "Answer deleted");
        Ok(())
    }
}
