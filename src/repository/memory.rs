use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{AnswerRepository, QuestionRepository, UserRepository};
use crate::domain::{Answer, Question, User};
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    questions: BTreeMap<i64, Question>,
    answers: BTreeMap<i64, Answer>,
    last_question_id: i64,
    last_answer_id: i64,
}

/// Process-local store backing every repository trait.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.read(|t| t.users.len())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        f(&self.tables.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        f(&mut self.tables.write().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        self.write(|t| {
            if t.users.contains_key(&user.id) || t.users.values().any(|u| u.email == user.email) {
                return Err(DatabaseError::UniqueConstraintViolation(
                    "users_email_key".to_string(),
                ));
            }
            t.users.insert(user.id.clone(), user.clone());
            Ok(())
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.read(|t| t.users.get(id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.read(|t| t.users.values().find(|u| u.email == email).cloned()))
    }
}

#[async_trait]
impl QuestionRepository for InMemoryStore {
    async fn insert_question(&self, text: &str) -> Result<Question, DatabaseError> {
        Ok(self.write(|t| {
            t.last_question_id += 1;
            let question = Question {
                id: t.last_question_id,
                text: text.to_string(),
                created_at: Utc::now(),
                answers: Vec::new(),
            };
            t.questions.insert(question.id, question.clone());
            question
        }))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>, DatabaseError> {
        Ok(self.read(|t| t.questions.get(&id).cloned()))
    }

    async fn list_questions(&self) -> Result<Vec<Question>, DatabaseError> {
        Ok(self.read(|t| t.questions.values().cloned().collect()))
    }

    async fn delete_question(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.write(|t| {
            let existed = t.questions.remove(&id).is_some();
            if existed {
                t.answers.retain(|_, answer| answer.question_id != id);
            }
            existed
        }))
    }
}

#[async_trait]
impl AnswerRepository for InMemoryStore {
    async fn insert_answer(
        &self,
        question_id: i64,
        user_id: &str,
        text: &str,
    ) -> Result<Answer, DatabaseError> {
        self.write(|t| {
            if !t.questions.contains_key(&question_id) {
                return Err(DatabaseError::ForeignKeyViolation(format!(
                    "question {} does not exist",
                    question_id
                )));
            }
            t.last_answer_id += 1;
            let answer = Answer {
                id: t.last_answer_id,
                question_id,
                user_id: user_id.to_string(),
                text: text.to_string(),
                created_at: Utc::now(),
            };
            t.answers.insert(answer.id, answer.clone());
            Ok(answer)
        })
    }

    async fn find_answer(&self, id: i64) -> Result<Option<Answer>, DatabaseError> {
        Ok(self.read(|t| t.answers.get(&id).cloned()))
    }

    async fn list_answers(&self, question_id: i64) -> Result<Vec<Answer>, DatabaseError> {
        Ok(self.read(|t| {
            t.answers
                .values()
                .filter(|answer| answer.question_id == question_id)
                .cloned()
                .collect()
        }))
    }

    async fn delete_answer(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.write(|t| t.answers.remove(&id).is_some()))
    }
}
