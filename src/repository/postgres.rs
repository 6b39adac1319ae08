use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AnswerRepository, QuestionRepository, UserRepository};
use crate::domain::{Answer, Question, User};
use crate::error::DatabaseError;

type UserRow = (String, String, String, DateTime<Utc>);
type QuestionRow = (i64, String, DateTime<Utc>);
type AnswerRow = (i64, i64, String, String, DateTime<Utc>);

/// Postgres-backed store; schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row((id, email, password_hash, created_at): UserRow) -> User {
    User {
        id,
        email,
        password_hash,
        created_at,
    }
}

fn question_from_row((id, text, created_at): QuestionRow) -> Question {
    Question {
        id,
        text,
        created_at,
        answers: Vec::new(),
    }
}

fn answer_from_row((id, question_id, user_id, text, created_at): AnswerRow) -> Answer {
    Answer {
        id,
        question_id,
        user_id,
        text,
        created_at,
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row))
    }
}

#[async_trait]
impl QuestionRepository for PgStore {
    async fn insert_question(&self, text: &str) -> Result<Question, DatabaseError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            "INSERT INTO questions (text) VALUES ($1) RETURNING id, text, created_at",
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(question_from_row(row))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, DatabaseError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, text, created_at FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(question_from_row))
    }

    async fn list_questions(&self) -> Result<Vec<Question>, DatabaseError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, text, created_at FROM questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(question_from_row).collect())
    }

    async fn delete_question(&self, id: i64) -> Result<bool, DatabaseError> {
        // answers go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnswerRepository for PgStore {
    async fn insert_answer(
        &self,
        question_id: i64,
        user_id: &str,
        text: &str,
    ) -> Result<Answer, DatabaseError> {
        let row = sqlx::query_as::<_, AnswerRow>(
            r#"
            INSERT INTO answers (question_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, question_id, user_id, text, created_at
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(answer_from_row(row))
    }

    async fn find_answer(&self, id: i64) -> Result<Option<Answer>, DatabaseError> {
        let row = sqlx::query_as::<_, AnswerRow>(
            "SELECT id, question_id, user_id, text, created_at FROM answers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(answer_from_row))
    }

    async fn list_answers(&self, question_id: i64) -> Result<Vec<Answer>, DatabaseError> {
        let rows = sqlx::query_as::<_, AnswerRow>(
            r#"
            SELECT id, question_id, user_id, text, created_at
            FROM answers
            WHERE question_id = $1
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(answer_from_row).collect())
    }

    async fn delete_answer(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
