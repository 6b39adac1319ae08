mod answers;
mod auth;
mod health_check;
mod questions;

pub use answers::{create_answer, delete_answer, get_answer};
pub use auth::{get_current_user, login, logout, refresh, register};
pub use health_check::health_check;
pub use questions::{create_question, delete_question, get_question, list_questions};
