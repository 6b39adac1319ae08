use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthManager, RefreshTokenLedger, TokenSigner};
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::repository::{AnswerRepository, QuestionRepository, UserRepository};
use crate::routes::{
    create_answer, create_question, delete_answer, delete_question, get_answer,
    get_current_user, get_question, health_check, list_questions, login, logout, refresh,
    register,
};
use crate::services::{AnswerService, QuestionService};

/// Shared application state handed to every worker.
#[derive(Clone)]
pub struct AppServices {
    auth: web::Data<AuthManager>,
    questions: web::Data<QuestionService>,
    answers: web::Data<AnswerService>,
}

impl AppServices {
    /// Builds the service graph over one store implementing every repository.
    pub fn new<S>(
        store: Arc<S>,
        signer: TokenSigner,
        ledger: Arc<RefreshTokenLedger>,
        password_hash_cost: u32,
    ) -> Self
    where
        S: UserRepository + QuestionRepository + AnswerRepository + 'static,
    {
        let auth = AuthManager::new(store.clone(), signer, ledger, password_hash_cost);
        let questions = QuestionService::new(store.clone(), store.clone());
        let answers = AnswerService::new(store.clone(), store);

        Self {
            auth: web::Data::new(auth),
            questions: web::Data::new(questions),
            answers: web::Data::new(answers),
        }
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::MalformedBody(err.to_string())).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| {
        AppError::from(ValidationError::InvalidFormat("id".to_string())).into()
    })
}

pub fn run(listener: TcpListener, services: AppServices) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        let auth = services.auth.clone();

        App::new()
            .wrap(LoggerMiddleware)
            .app_data(json_config())
            .app_data(path_config())
            .app_data(auth.clone())
            .app_data(services.questions.clone())
            .app_data(services.answers.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/logout", web::post().to(logout))
                    .service(
                        web::resource("/me")
                            .wrap(JwtMiddleware::new(auth.clone()))
                            .route(web::get().to(get_current_user)),
                    ),
            )
            .service(
                web::resource("/questions")
                    .route(web::get().to(list_questions))
                    .route(web::post().to(create_question)),
            )
            .service(
                web::resource("/questions/{id}")
                    .route(web::get().to(get_question))
                    .route(web::delete().to(delete_question)),
            )
            .service(
                web::resource("/questions/{id}/answers")
                    .wrap(JwtMiddleware::new(auth.clone()))
                    .route(web::post().to(create_answer)),
            )
            // Same path, public read and gated delete.
            .service(
                web::resource("/answers/{id}")
                    .guard(guard::Get())
                    .route(web::get().to(get_answer)),
            )
            .service(
                web::resource("/answers/{id}")
                    .guard(guard::Delete())
                    .wrap(JwtMiddleware::new(auth.clone()))
                    .route(web::delete().to(delete_answer)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
