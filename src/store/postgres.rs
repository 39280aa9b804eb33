use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};

use super::QuizStore;
use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Question, Quiz},
        result::{AnswerRecord, NewQuizResult, QuizResult},
        user::{NewUser, User},
    },
};

/// Postgres-backed store. Questions and answers live in JSONB columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper struct for reading the 'quizzes' table.
#[derive(FromRow)]
struct QuizRow {
    id: i64,
    code: String,
    topic: String,
    category: String,
    difficulty: String,
    created_by: i64,
    questions: Json<Vec<Question>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = AppError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        Ok(Quiz {
            id: row.id,
            code: row.code,
            topic: row.topic,
            category: row.category,
            difficulty: row.difficulty.parse().map_err(AppError::InternalServerError)?,
            created_by: row.created_by,
            questions: row.questions.0,
            created_at: row.created_at,
        })
    }
}

/// Helper struct for reading the 'quiz_results' table.
#[derive(FromRow)]
struct ResultRow {
    id: i64,
    quiz_id: i64,
    user_id: i64,
    user_name: String,
    user_email: String,
    answers: Json<Vec<AnswerRecord>>,
    total_questions: i32,
    correct_answers: i32,
    percentage: i32,
    performance: String,
    time_spent: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ResultRow> for QuizResult {
    type Error = AppError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        Ok(QuizResult {
            id: row.id,
            quiz_id: row.quiz_id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            answers: row.answers.0,
            total_questions: row.total_questions.max(0) as u32,
            correct_answers: row.correct_answers.max(0) as u32,
            percentage: row.percentage.max(0) as u32,
            performance: row.performance.parse().map_err(AppError::InternalServerError)?,
            time_spent: row.time_spent.max(0) as u64,
            created_at: row.created_at,
        })
    }
}

const QUIZ_COLUMNS: &str =
    "id, code, topic, category, difficulty, created_by, questions, created_at";

const RESULT_COLUMNS: &str = "id, quiz_id, user_id, user_name, user_email, answers, \
     total_questions, correct_answers, percentage, performance, time_spent, created_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl QuizStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password, role, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("User with email '{}' already exists", user.email))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user_role(&self, id: i64, role: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET role = $1 WHERE id = $2
            RETURNING id, name, email, password, role, created_at
            "#,
        )
        .bind(role)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            r#"
            INSERT INTO quizzes (code, topic, category, difficulty, created_by, questions)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(&quiz.code)
        .bind(&quiz.topic)
        .bind(&quiz.category)
        .bind(quiz.difficulty.as_str())
        .bind(quiz.created_by)
        .bind(Json(&quiz.questions))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Quiz code '{}' already exists", quiz.code))
            } else {
                tracing::error!("Failed to insert quiz: {:?}", e);
                AppError::from(e)
            }
        })?;

        row.try_into()
    }

    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError> {
        sqlx::query_as::<_, QuizRow>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Quiz::try_from)
            .transpose()
    }

    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<Quiz>, AppError> {
        sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .map(Quiz::try_from)
        .transpose()
    }

    async fn list_quizzes_by_owner(&self, owner: i64) -> Result<Vec<Quiz>, AppError> {
        sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE created_by = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::from(e)
        })?
        .into_iter()
        .map(Quiz::try_from)
        .collect()
    }

    async fn insert_result(&self, result: NewQuizResult) -> Result<QuizResult, AppError> {
        let row = sqlx::query_as::<_, ResultRow>(&format!(
            r#"
            INSERT INTO quiz_results
            (quiz_id, user_id, user_name, user_email, answers,
             total_questions, correct_answers, percentage, performance, time_spent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(result.quiz_id)
        .bind(result.user_id)
        .bind(&result.user_name)
        .bind(&result.user_email)
        .bind(Json(&result.answers))
        .bind(result.total_questions as i32)
        .bind(result.correct_answers as i32)
        .bind(result.percentage as i32)
        .bind(result.performance.as_str())
        .bind(i64::try_from(result.time_spent).unwrap_or(i64::MAX))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record quiz result: {:?}", e);
            AppError::from(e)
        })?;

        row.try_into()
    }

    async fn list_results(&self, quiz_id: i64) -> Result<Vec<QuizResult>, AppError> {
        sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {RESULT_COLUMNS} FROM quiz_results WHERE quiz_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(QuizResult::try_from)
        .collect()
    }
}
