// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::JOIN_CODE_ATTEMPTS,
    error::AppError,
    generator::QuizGenerator,
    models::{
        quiz::{AdminQuizSummary, CreateQuizRequest, NewQuiz, PublicQuiz, QuizHeader},
        result::{NewQuizResult, QuizResultsResponse, SubmitQuizRequest, SubmitResponse},
    },
    scoring::{AnswerSheet, aggregate, build_report, score},
    store::DynStore,
    utils::{
        code::{generate_join_code, normalize_join_code},
        jwt::Claims,
    },
};

/// Generates a quiz with the AI generator and stores it under a fresh join code.
/// Admin only.
pub async fn create_quiz(
    State(store): State<DynStore>,
    State(generator): State<Arc<dyn QuizGenerator>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner = claims.user_id()?;
    let questions = generator.generate(&payload).await?;

    for attempt in 1..=JOIN_CODE_ATTEMPTS {
        let new_quiz = NewQuiz {
            code: generate_join_code(),
            topic: payload.topic.trim().to_string(),
            category: payload.category.trim().to_string(),
            difficulty: payload.difficulty,
            created_by: owner,
            questions: questions.clone(),
        };

        match store.insert_quiz(new_quiz).await {
            Ok(quiz) => {
                tracing::info!(
                    quiz_id = quiz.id,
                    code = %quiz.code,
                    questions = quiz.questions.len(),
                    "quiz created"
                );
                return Ok((StatusCode::CREATED, Json(quiz)));
            }
            Err(AppError::Conflict(_)) => {
                tracing::warn!(attempt, "join code collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::InternalServerError(format!(
        "no unused join code after {JOIN_CODE_ATTEMPTS} attempts"
    )))
}

/// Lists the caller's quizzes, newest first, each with attempt statistics.
/// Admin only.
pub async fn list_admin_quizzes(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.list_quizzes_by_owner(claims.user_id()?).await?;

    let mut summaries = Vec::with_capacity(quizzes.len());
    for quiz in quizzes {
        let results = store.list_results(quiz.id).await?;
        summaries.push(AdminQuizSummary::new(quiz, aggregate(&results)));
    }

    Ok(Json(summaries))
}

/// Every stored attempt on one of the caller's quizzes.
/// Quizzes owned by someone else are reported as not found.
pub async fn quiz_results(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner = claims.user_id()?;
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .filter(|q| q.created_by == owner)
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let results = store.list_results(quiz.id).await?;
    let statistics = aggregate(&results);

    Ok(Json(QuizResultsResponse {
        quiz: QuizHeader::from(&quiz),
        results,
        statistics,
    }))
}

/// Looks a quiz up by join code (case-insensitive) without revealing answers.
pub async fn join_quiz(
    State(store): State<DynStore>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store
        .find_quiz_by_code(&normalize_join_code(&code))
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(PublicQuiz::from(quiz)))
}

/// Scores an attempt, records it, and returns the report.
pub async fn submit_quiz(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let user = store
        .find_user(claims.user_id()?)
        .await?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    let sheet: AnswerSheet = payload.answers.iter().collect();
    if sheet.is_empty() {
        tracing::debug!(quiz_id = quiz.id, "submission carries no usable answers");
    }
    let scored = score(&quiz.questions, &sheet).map_err(|e| {
        tracing::error!(quiz_id = quiz.id, "Failed to score quiz: {}", e);
        AppError::from(e)
    })?;
    let report = build_report(scored, payload.time_spent);

    let stored = store
        .insert_result(NewQuizResult::from_report(quiz.id, &user, &report))
        .await?;

    tracing::info!(
        quiz_id = quiz.id,
        user_id = user.id,
        answered = sheet.len(),
        percentage = report.percentage,
        performance = %report.performance,
        "quiz submitted"
    );

    Ok(Json(SubmitResponse {
        result_id: stored.id,
        completed_at: stored.created_at,
        report,
    }))
}
