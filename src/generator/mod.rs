//! AI quiz generation.
//!
//! The service only depends on [`QuizGenerator`]; [`gemini::GeminiGenerator`]
//! is the production implementation.

pub mod gemini;

use std::{collections::HashSet, sync::LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::models::{
    quiz::{CreateQuizRequest, Difficulty, Question},
    result::json_id,
};

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("quiz generation is not configured")]
    NotConfigured,

    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation service returned no text")]
    EmptyResponse,

    #[error("generated quiz is malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Produces a validated, non-empty question set for `request`.
    async fn generate(&self, request: &CreateQuizRequest) -> Result<Vec<Question>, GeneratorError>;
}

/// Builds the instruction text sent to the model.
pub fn build_prompt(request: &CreateQuizRequest) -> String {
    format!(
        r#"Generate a {difficulty} level quiz about "{topic}" with {count} multiple-choice questions.
The quiz should be in the category: {category}.

For each question, provide:
1. The question text
2. 4 options
3. The correct answer (0, 1, 2, or 3 - the index of the correct option)
4. A brief explanation
5. A short sub-topic of {category} the question covers, as "category"
6. The difficulty of the question itself (easy, medium or hard), as "difficulty"

Respond with a JSON object only, using this structure:
{{
  "title": "Quiz Title",
  "description": "Quiz Description",
  "questions": [
    {{
      "id": "q1",
      "question": "Question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "explanation": "Brief explanation",
      "category": "Sub-topic",
      "difficulty": "{difficulty}"
    }}
  ]
}}"#,
        difficulty = request.difficulty,
        topic = request.topic,
        count = request.number_of_questions,
        category = request.category,
    )
}

#[derive(Debug, Deserialize)]
struct GeneratedQuiz {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    #[serde(default)]
    id: Option<serde_json::Value>,
    question: String,
    options: Vec<String>,
    correct_answer: i64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?[ \t]*\r?\n?").expect("valid fence regex"));

/// Parses model output into questions.
///
/// Markdown fences are stripped, at most `limit` questions are kept and
/// missing, blank, non-scalar or repeated ids are replaced by `q{position}`.
/// Numeric ids are kept as their decimal text.
pub fn parse_generated_quiz(text: &str, limit: usize) -> Result<Vec<Question>, GeneratorError> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    let quiz: GeneratedQuiz = serde_json::from_str(cleaned.trim())
        .map_err(|e| GeneratorError::Malformed(e.to_string()))?;

    if quiz.questions.is_empty() {
        return Err(GeneratorError::Malformed("no questions".to_string()));
    }

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(quiz.questions.len().min(limit));

    for (index, raw) in quiz.questions.into_iter().take(limit).enumerate() {
        let position = index + 1;

        if raw.question.trim().is_empty() {
            return Err(GeneratorError::Malformed(format!(
                "question {position} has no text"
            )));
        }
        if raw.options.len() != 4 {
            return Err(GeneratorError::Malformed(format!(
                "question {position} has {} options, expected 4",
                raw.options.len()
            )));
        }
        if !(0..4).contains(&raw.correct_answer) {
            return Err(GeneratorError::Malformed(format!(
                "question {position} has answer index {}",
                raw.correct_answer
            )));
        }

        let id = match raw.id.as_ref().and_then(json_id) {
            Some(id) if !id.is_empty() && !seen.contains(&id) => id,
            _ => format!("q{position}"),
        };
        seen.insert(id.clone());

        questions.push(Question {
            id,
            text: raw.question.trim().to_string(),
            options: raw.options,
            correct_option_index: raw.correct_answer,
            explanation: raw.explanation,
            category: raw
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            difficulty: raw.difficulty.and_then(|d| d.parse::<Difficulty>().ok()),
        });
    }

    Ok(questions)
}
