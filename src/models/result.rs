// src/models/result.rs

use serde::{Deserialize, Serialize};

use crate::{
    models::quiz::QuizHeader,
    scoring::{
        UNANSWERED, aggregate::QuizStatistics, report::PerformanceTier, report::Report,
    },
};

/// One `{questionId, selectedAnswer}` pair from the client.
///
/// `selectedAnswer` is untrusted and kept as raw JSON: only integers count as
/// a selection, anything else is treated as unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    #[serde(default, alias = "selectedOptionIndex")]
    pub selected_answer: serde_json::Value,
}

impl SubmittedAnswer {
    pub fn new(question_id: impl Into<String>, selected: i64) -> Self {
        Self {
            question_id: question_id.into(),
            selected_answer: serde_json::Value::from(selected),
        }
    }

    /// Reads one entry of a raw `answers` array.
    ///
    /// Returns `None` when the entry is not an object or has no usable
    /// `questionId`; such entries match no question.
    pub fn from_json(entry: &serde_json::Value) -> Option<Self> {
        let question_id = json_id(entry.get("questionId")?)?;
        let selected_answer = entry
            .get("selectedAnswer")
            .or_else(|| entry.get("selectedOptionIndex"))
            .cloned()
            .unwrap_or_default();
        Some(Self {
            question_id,
            selected_answer,
        })
    }

    /// The selected option index, or [`UNANSWERED`] when the value is not an integer.
    pub fn selection(&self) -> i64 {
        self.selected_answer.as_i64().unwrap_or(UNANSWERED)
    }
}

/// DTO for submitting a quiz attempt.
///
/// Both fields are read leniently: a bad entry in `answers` is dropped and a
/// non-numeric `timeSpent` counts as not reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub answers: Vec<SubmittedAnswer>,
    /// Seconds spent on the attempt, as reported by the client.
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub time_spent: Option<i64>,
}

fn deserialize_answers<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<Vec<SubmittedAnswer>, D::Error> {
    let raw = serde_json::Value::deserialize(d)?;
    let entries = raw.as_array().map(Vec::as_slice).unwrap_or_default();
    Ok(entries.iter().filter_map(SubmittedAnswer::from_json).collect())
}

fn deserialize_seconds<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let raw = serde_json::Value::deserialize(d)?;
    Ok(raw.as_i64().or_else(|| raw.as_f64().map(|secs| secs as i64)))
}

/// String ids are trimmed, numeric ids are stringified; anything else, or a
/// blank string, is no id at all.
pub(crate) fn json_id(value: &serde_json::Value) -> Option<String> {
    let id = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Per-question outcome persisted with a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_answer: i64,
    pub is_correct: bool,
}

/// A stored quiz attempt.
///
/// `user_name` and `user_email` are copied from the user at submit time and
/// are not updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub answers: Vec<AnswerRecord>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: u32,
    pub performance: PerformanceTier,
    pub time_spent: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a result; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub quiz_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub answers: Vec<AnswerRecord>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: u32,
    pub performance: PerformanceTier,
    pub time_spent: u64,
}

impl NewQuizResult {
    /// Snapshots the report and the submitting user's identity.
    pub fn from_report(quiz_id: i64, user: &crate::models::user::User, report: &Report) -> Self {
        Self {
            quiz_id,
            user_id: user.id,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            answers: report
                .results
                .iter()
                .map(|o| AnswerRecord {
                    question_id: o.question_id.clone(),
                    selected_answer: o.selected_answer,
                    is_correct: o.is_correct,
                })
                .collect(),
            total_questions: report.total_questions,
            correct_answers: report.correct_answers,
            percentage: report.percentage,
            performance: report.performance,
            time_spent: report.time_spent,
        }
    }
}

/// Response to a submit call: the report plus where it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub result_id: i64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    pub report: Report,
}

/// Admin view of every attempt on one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultsResponse {
    pub quiz: QuizHeader,
    pub results: Vec<QuizResult>,
    pub statistics: QuizStatistics,
}
