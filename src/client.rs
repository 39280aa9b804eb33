//! Typed HTTP client for the quiz API.
//!
//! Configuration and credential live on the [`ApiClient`] value; nothing is
//! stored process-wide. `register`/`login` acquire a credential, `refresh`
//! replaces it and `clear_credential` drops it.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::models::{
    quiz::{AdminQuizSummary, CreateQuizRequest, PublicQuiz, Quiz},
    result::{QuizResultsResponse, SubmitQuizRequest, SubmitResponse},
    user::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, UpdateRoleRequest},
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API responded with {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("no credential: log in or register first")]
    MissingCredential,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:3000`. The `/api` prefix is added per call.
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(30),
        })
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    credential: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            credential: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn set_credential(&mut self, token: impl Into<String>) {
        self.credential = Some(token.into());
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        authed: bool,
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.config.base_url.join(&format!("api/{path}"))?;
        let builder = self.http.request(method, url);
        if !authed {
            return Ok(builder);
        }
        let token = self.credential.as_deref().ok_or(ClientError::MissingCredential)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // error bodies are `{"error": "..."}`, but middleware rejections are empty
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("Request failed").to_string()
                } else {
                    text
                }
            });
        Err(ClientError::Api { status, message })
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<T, ClientError> {
        let mut builder = self.request(method, path, authed)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Self::send(builder).await
    }

    async fn acquire(
        &mut self,
        path: &str,
        body: Option<&impl Serialize>,
        authed: bool,
    ) -> Result<AuthResponse, ClientError> {
        let response: AuthResponse = self.call(Method::POST, path, body, authed).await?;
        self.credential = Some(response.token.clone());
        Ok(response)
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.acquire("auth/register", Some(&body), false).await
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.acquire("auth/login", Some(&body), false).await
    }

    /// Exchanges the current credential for a new one.
    pub async fn refresh(&mut self) -> Result<AuthResponse, ClientError> {
        self.acquire("auth/refresh", None::<&()>, true).await
    }

    /// Changes the caller's role and keeps the reissued credential.
    pub async fn update_role(&mut self, role: &str) -> Result<AuthResponse, ClientError> {
        let body = UpdateRoleRequest { role: role.to_string() };
        let response: AuthResponse = self.call(Method::PUT, "auth/role", Some(&body), true).await?;
        self.credential = Some(response.token.clone());
        Ok(response)
    }

    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        self.call(Method::GET, "auth/me", None::<&()>, true).await
    }

    pub async fn create_quiz(&self, request: &CreateQuizRequest) -> Result<Quiz, ClientError> {
        self.call(Method::POST, "quiz/create", Some(request), true).await
    }

    pub async fn admin_quizzes(&self) -> Result<Vec<AdminQuizSummary>, ClientError> {
        self.call(Method::GET, "quiz/admin/quizzes", None::<&()>, true).await
    }

    pub async fn quiz_results(&self, quiz_id: i64) -> Result<QuizResultsResponse, ClientError> {
        let path = format!("quiz/admin/quiz/{quiz_id}/results");
        self.call(Method::GET, &path, None::<&()>, true).await
    }

    pub async fn join_quiz(&self, code: &str) -> Result<PublicQuiz, ClientError> {
        let path = format!("quiz/join/{}", code.trim());
        self.call(Method::GET, &path, None::<&()>, true).await
    }

    pub async fn submit_quiz(
        &self,
        quiz_id: i64,
        submission: &SubmitQuizRequest,
    ) -> Result<SubmitResponse, ClientError> {
        let path = format!("quiz/submit/{quiz_id}");
        self.call(Method::POST, &path, Some(submission), true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authed_calls_need_a_credential() {
        let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        assert!(matches!(client.me().await, Err(ClientError::MissingCredential)));
    }

    #[test]
    fn credential_lifecycle_is_explicit() {
        let config = ClientConfig::new("http://localhost:3000").unwrap();
        let mut client = ApiClient::new(config).unwrap();
        assert_eq!(client.credential(), None);

        client.set_credential("abc");
        assert_eq!(client.credential(), Some("abc"));

        client.clear_credential();
        assert_eq!(client.credential(), None);
    }

    #[test]
    fn paths_are_joined_under_api() {
        let client = ApiClient::new(ClientConfig::new("http://localhost:3000").unwrap()).unwrap();
        let request = client
            .request(Method::GET, "quiz/join/ABC123", false)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:3000/api/quiz/join/ABC123");
    }
}
