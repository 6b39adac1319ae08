use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::QuestionService;

#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    pub text: String,
}

/// GET /questions
pub async fn list_questions(
    questions: web::Data<QuestionService>,
) -> Result<HttpResponse, AppError> {
    let questions = questions.list().await?;
    Ok(HttpResponse::Ok().json(questions))
}

/// POST /questions
pub async fn create_question(
    form: web::Json<CreateQuestionRequest>,
    questions: web::Data<QuestionService>,
) -> Result<HttpResponse, AppError> {
    let question = questions.create(&form.text).await?;
    Ok(HttpResponse::Created().json(question))
}

/// GET /questions/{id}
///
/// Includes the question's answers.
pub async fn get_question(
    path: web::Path<i64>,
    questions: web::Data<QuestionService>,
) -> Result<HttpResponse, AppError> {
    let question = questions.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(question))
}

/// DELETE /questions/{id}
pub async fn delete_question(
    path: web::Path<i64>,
    questions: web::Data<QuestionService>,
) -> Result<HttpResponse, AppError> {
    questions.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
