// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

/// Length of a quiz join code.
pub const JOIN_CODE_LENGTH: usize = 6;
/// Attempts at finding an unused join code before giving up.
pub const JOIN_CODE_ATTEMPTS: usize = 5;
/// Questions generated when the admin does not say how many.
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without one the service keeps everything in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: Url::parse(DEFAULT_GEMINI_BASE_URL).expect("default Gemini URL is valid"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .map(|v| v.parse().expect("JWT_EXPIRATION must be a number of seconds"))
            .unwrap_or(7 * 24 * 60 * 60);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .map(|v| v.parse().expect("PORT must be a valid port number"))
            .unwrap_or(3000);

        let gemini = GeminiConfig {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: env::var("GEMINI_BASE_URL")
                .map(|v| Url::parse(&v).expect("GEMINI_BASE_URL must be a valid URL"))
                .unwrap_or_else(|_| GeminiConfig::default().base_url),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            admin_name: env::var("ADMIN_NAME").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            gemini,
        }
    }
}
