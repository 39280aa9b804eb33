use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GeneratorError, QuizGenerator, build_prompt, parse_generated_quiz};
use crate::{
    config::GeminiConfig,
    models::quiz::{CreateQuizRequest, Question},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Quiz generation through Google's Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> Result<url::Url, GeneratorError> {
        self.config
            .base_url
            .join(&format!(
                "v1beta/models/{}:generateContent",
                self.config.model
            ))
            .map_err(|e| GeneratorError::Malformed(format!("invalid Gemini endpoint: {e}")))
    }
}

#[async_trait]
impl QuizGenerator for GeminiGenerator {
    async fn generate(&self, request: &CreateQuizRequest) -> Result<Vec<Question>, GeneratorError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GeneratorError::NotConfigured)?;

        let prompt = build_prompt(request);
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        tracing::info!(
            topic = %request.topic,
            model = %self.config.model,
            questions = request.number_of_questions,
            "requesting quiz generation"
        );

        let response = self
            .client
            .post(self.endpoint()?)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }

        let questions = parse_generated_quiz(&text, request.number_of_questions as usize)?;
        tracing::debug!(count = questions.len(), "generated questions parsed");
        Ok(questions)
    }
}
