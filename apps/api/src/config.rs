use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a number does not parse.
#[derive(Clone)]
pub struct Config {
    /// Opaque credential handed to the model client. Never logged.
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub target_question_count: u32,
    pub question_bank_size: usize,
    pub model_call_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let question_bank_size = parse_env("QUESTION_BANK_SIZE", 15usize)?;
        if question_bank_size == 0 {
            bail!("QUESTION_BANK_SIZE must be at least 1");
        }

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| crate::llm_client::GEMINI_BASE_URL.to_string()),
            target_question_count: parse_env("TARGET_QUESTION_COUNT", 5u32)?,
            question_bank_size,
            model_call_timeout: Duration::from_secs(parse_env("MODEL_CALL_TIMEOUT_SECS", 60u64)?),
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Interview knobs handed to every new session.
    pub fn interview_settings(&self) -> crate::interview::session::SessionSettings {
        crate::interview::session::SessionSettings {
            target_question_count: self.target_question_count,
            question_bank_size: self.question_bank_size,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("target_question_count", &self.target_question_count)
            .field("question_bank_size", &self.question_bank_size)
            .field("model_call_timeout", &self.model_call_timeout)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
