// src/models/quiz.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::scoring::aggregate::QuizStatistics;

/// Difficulty level of a quiz, or of a single question when tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// A single multiple-choice question.
/// Stored as an element of the quiz's JSONB `questions` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable identifier, unique within its quiz.
    pub id: String,

    #[serde(rename = "question")]
    pub text: String,

    /// Exactly four options.
    pub options: Vec<String>,

    #[serde(rename = "correctAnswer")]
    pub correct_option_index: i64,

    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// A quiz as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    /// Six character join code, always upper-case.
    pub code: String,
    pub topic: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub created_by: i64,
    pub questions: Vec<Question>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a quiz; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub code: String,
    pub topic: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub created_by: i64,
    pub questions: Vec<Question>,
}

/// DTO for an admin asking for a new AI-generated quiz.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Topic must be between 1 and 200 characters."))]
    pub topic: String,
    pub difficulty: Difficulty,
    #[validate(length(min = 1, max = 100, message = "Category must be between 1 and 100 characters."))]
    pub category: String,
    #[serde(default = "default_question_count")]
    #[validate(range(min = 1, max = 20, message = "Number of questions must be between 1 and 20."))]
    pub number_of_questions: u32,
}

fn default_question_count() -> u32 {
    crate::config::DEFAULT_QUESTION_COUNT
}

/// Question as sent to a user joining a quiz (no answer, no explanation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Quiz as sent to a user joining by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuiz {
    pub id: i64,
    pub code: String,
    pub topic: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub questions: Vec<PublicQuestion>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            code: quiz.code,
            topic: quiz.topic,
            category: quiz.category,
            difficulty: quiz.difficulty,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    question: q.text,
                    options: q.options,
                    category: q.category,
                    difficulty: q.difficulty,
                })
                .collect(),
            created_at: quiz.created_at,
        }
    }
}

/// Question in the admin listing: keeps the answer, drops the explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
}

/// One entry of the admin's quiz list, with per-quiz statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuizSummary {
    pub id: i64,
    pub code: String,
    pub topic: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub questions: Vec<AdminQuestion>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub statistics: QuizStatistics,
}

impl AdminQuizSummary {
    pub fn new(quiz: Quiz, statistics: QuizStatistics) -> Self {
        Self {
            id: quiz.id,
            code: quiz.code,
            topic: quiz.topic,
            category: quiz.category,
            difficulty: quiz.difficulty,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| AdminQuestion {
                    id: q.id,
                    question: q.text,
                    options: q.options,
                    correct_answer: q.correct_option_index,
                })
                .collect(),
            created_at: quiz.created_at,
            statistics,
        }
    }
}

/// Short quiz header used by the admin results view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHeader {
    pub id: i64,
    pub topic: String,
    pub code: String,
    pub difficulty: Difficulty,
    pub category: String,
}

impl From<&Quiz> for QuizHeader {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            topic: quiz.topic.clone(),
            code: quiz.code.clone(),
            difficulty: quiz.difficulty,
            category: quiz.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_uses_wire_names() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "id": "q1",
            "question": "2 + 2?",
            "options": ["1", "2", "3", "4"],
            "correctAnswer": 3,
            "explanation": "Arithmetic"
        }))
        .unwrap();

        assert_eq!(q.text, "2 + 2?");
        assert_eq!(q.correct_option_index, 3);
        assert!(q.category.is_none());

        let back = serde_json::to_value(&q).unwrap();
        assert!(back.get("category").is_none());
        assert_eq!(back["correctAnswer"], 3);
    }

    #[test]
    fn public_quiz_hides_answers() {
        let quiz = Quiz {
            id: 7,
            code: "ABC123".into(),
            topic: "Rust".into(),
            category: "Programming".into(),
            difficulty: Difficulty::Medium,
            created_by: 1,
            questions: vec![Question {
                id: "q1".into(),
                text: "Borrow?".into(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_option_index: 0,
                explanation: "secret".into(),
                category: None,
                difficulty: None,
            }],
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(PublicQuiz::from(quiz)).unwrap();
        let q = &json["questions"][0];
        assert!(q.get("correctAnswer").is_none());
        assert!(q.get("explanation").is_none());
        assert_eq!(q["question"], "Borrow?");
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("extreme".parse::<Difficulty>().is_err());
    }
}
