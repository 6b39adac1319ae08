use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::services::AnswerService;

/// The author is never taken from the body.
#[derive(Deserialize)]
pub struct CreateAnswerRequest {
    pub text: String,
}

/// POST /questions/{id}/answers (authenticated)
pub async fn create_answer(
    path: web::Path<i64>,
    form: web::Json<CreateAnswerRequest>,
    user: web::ReqData<AuthenticatedUser>,
    answers: web::Data<AnswerService>,
) -> Result<HttpResponse, AppError> {
    let answer = answers
        .create(path.into_inner(), &user, &form.text)
        .await?;
    Ok(HttpResponse::Created().json(answer))
}

/// GET /answers/{id}
pub async fn get_answer(
    path: web::Path<i64>,
    answers: web::Data<AnswerService>,
) -> Result<HttpResponse, AppError> {
    let answer = answers.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(answer))
}

/// DELETE /answers/{id} (authenticated)
pub async fn delete_answer(
    path: web::Path<i64>,
    user: web::ReqData<AuthenticatedUser>,
    answers: web::Data<AnswerService>,
) -> Result<HttpResponse, AppError> {
    answers.delete(path.into_inner(), &user).await?;
    Ok(HttpResponse::NoContent().finish())
}
