/// Persistence boundary
///
/// Traits for the stores the services depend on, with a Postgres
/// implementation for production and an in-memory one for tests and local runs.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::domain::{Answer, Question, User};
use crate::error::DatabaseError;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Credential store. Emails are passed already lowercased.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DatabaseError::UniqueConstraintViolation` if the id or email is taken.
    async fn insert(&self, user: &User) -> Result<(), DatabaseError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert_question(&self, text: &str) -> Result<Question, DatabaseError>;
    /// Returns the question without its answers.
    async fn find_question(&self, id: i64) -> Result<Option<Question>, DatabaseError>;
    async fn list_questions(&self) -> Result<Vec<Question>, DatabaseError>;
    /// Deletes the question and its answers. Returns whether it existed.
    async fn delete_question(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Fails with `DatabaseError::ForeignKeyViolation` if the question does not exist.
    async fn insert_answer(
        &self,
        question_id: i64,
        user_id: &str,
        text: &str,
    ) -> Result<Answer, DatabaseError>;
    async fn find_answer(&self, id: i64) -> Result<Option<Answer>, DatabaseError>;
    async fn list_answers(&self, question_id: i64) -> Result<Vec<Answer>, DatabaseError>;
    async fn delete_answer(&self, id: i64) -> Result<bool, DatabaseError>;
}
