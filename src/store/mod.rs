//! Persistence of users, quizzes and quiz results.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz},
        result::{NewQuizResult, QuizResult},
        user::{NewUser, User},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynStore = Arc<dyn QuizStore>;

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn update_user_role(&self, id: i64, role: &str) -> Result<Option<User>, AppError>;

    /// Fails with `AppError::Conflict` when the join code is taken.
    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError>;

    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError>;

    /// `code` must already be upper-case.
    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<Quiz>, AppError>;

    /// Newest first.
    async fn list_quizzes_by_owner(&self, owner: i64) -> Result<Vec<Quiz>, AppError>;

    async fn insert_result(&self, result: NewQuizResult) -> Result<QuizResult, AppError>;

    /// Newest first.
    async fn list_results(&self, quiz_id: i64) -> Result<Vec<QuizResult>, AppError>;
}
