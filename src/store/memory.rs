use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::QuizStore;
use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz},
        result::{NewQuizResult, QuizResult},
        user::{NewUser, User},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    quizzes: Vec<Quiz>,
    results: Vec<QuizResult>,
    codes: HashMap<String, i64>,
}

/// Store kept entirely in process memory. Ids start at 1 per table.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }

        let user = User {
            id: tables.users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user_role(&self, id: i64, role: &str) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role.to_string();
            u.clone()
        }))
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let mut tables = self.tables.write().await;
        if tables.codes.contains_key(&quiz.code) {
            return Err(AppError::Conflict(format!(
                "Quiz code '{}' already exists",
                quiz.code
            )));
        }

        let quiz = Quiz {
            id: tables.quizzes.len() as i64 + 1,
            code: quiz.code,
            topic: quiz.topic,
            category: quiz.category,
            difficulty: quiz.difficulty,
            created_by: quiz.created_by,
            questions: quiz.questions,
            created_at: Utc::now(),
        };
        tables.codes.insert(quiz.code.clone(), quiz.id);
        tables.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<Quiz>, AppError> {
        let tables = self.tables.read().await;
        let Some(id) = tables.codes.get(code).copied() else {
            return Ok(None);
        };
        Ok(tables.quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn list_quizzes_by_owner(&self, owner: i64) -> Result<Vec<Quiz>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .iter()
            .rev()
            .filter(|q| q.created_by == owner)
            .cloned()
            .collect())
    }

    async fn insert_result(&self, result: NewQuizResult) -> Result<QuizResult, AppError> {
        let mut tables = self.tables.write().await;
        let result = QuizResult {
            id: tables.results.len() as i64 + 1,
            quiz_id: result.quiz_id,
            user_id: result.user_id,
            user_name: result.user_name,
            user_email: result.user_email,
            answers: result.answers,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            percentage: result.percentage,
            performance: result.performance,
            time_spent: result.time_spent,
            created_at: Utc::now(),
        };
        tables.results.push(result.clone());
        Ok(result)
    }

    async fn list_results(&self, quiz_id: i64) -> Result<Vec<QuizResult>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .results
            .iter()
            .rev()
            .filter(|r| r.quiz_id == quiz_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::quiz::Difficulty,
        scoring::{PerformanceTier, scorer::tests::question},
    };

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password: "hash".into(),
            role: "user".into(),
        }
    }

    fn new_quiz(code: &str, owner: i64) -> NewQuiz {
        NewQuiz {
            code: code.into(),
            topic: "Rust".into(),
            category: "Programming".into(),
            difficulty: Difficulty::Easy,
            created_by: owner,
            questions: vec![question("q1", 0)],
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();

        let err = store.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn role_updates_are_visible() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("b@example.com")).await.unwrap();

        let updated = store.update_user_role(user.id, "admin").await.unwrap().unwrap();
        assert_eq!(updated.role, "admin");
        assert_eq!(store.find_user(user.id).await.unwrap().unwrap().role, "admin");
        assert!(store.update_user_role(99, "admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn quiz_codes_are_unique_and_listed_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert_quiz(new_quiz("AAAAAA", 1)).await.unwrap();
        let second = store.insert_quiz(new_quiz("BBBBBB", 1)).await.unwrap();
        store.insert_quiz(new_quiz("CCCCCC", 2)).await.unwrap();

        let err = store.insert_quiz(new_quiz("AAAAAA", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let found = store.find_quiz_by_code("BBBBBB").await.unwrap().unwrap();
        assert_eq!(found.id, second.id);

        let owned: Vec<i64> = store
            .list_quizzes_by_owner(1)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(owned, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn results_are_filtered_by_quiz() {
        let store = MemoryStore::new();
        for quiz_id in [1, 2, 1] {
            store
                .insert_result(NewQuizResult {
                    quiz_id,
                    user_id: 1,
                    user_name: "Ada".into(),
                    user_email: "a@example.com".into(),
                    answers: Vec::new(),
                    total_questions: 1,
                    correct_answers: 1,
                    percentage: 100,
                    performance: PerformanceTier::Excellent,
                    time_spent: 3,
                })
                .await
                .unwrap();
        }

        let results = store.list_results(1).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 3);
        assert!(store.list_results(3).await.unwrap().is_empty());
    }
}
