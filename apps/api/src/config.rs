use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::cv::normalizer::NormalizeStrategy;
use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub completion_timeout: Duration,
    /// Bound on one HTTP attempt, always shorter than `completion_timeout` so
    /// the client still has time to retry.
    pub llm_request_timeout: Duration,
    /// Built-in template when unset.
    pub prompt_template_path: Option<PathBuf>,
    pub normalizer: NormalizeStrategy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let completion_timeout =
            Duration::from_secs(parse_env("COMPLETION_TIMEOUT_SECS", 120)?);
        let requested_attempt_timeout = std::env::var("LLM_REQUEST_TIMEOUT_SECS")
            .ok()
            .map(|raw| parse_value::<u64>("LLM_REQUEST_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_api_url: env_or("LLM_API_URL", DEFAULT_API_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.7)?,
            completion_timeout,
            llm_request_timeout: attempt_timeout(completion_timeout, requested_attempt_timeout),
            prompt_template_path: std::env::var("PROMPT_TEMPLATE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            normalizer: std::env::var("NORMALIZER")
                .ok()
                .map(|v| v.parse::<NormalizeStrategy>().map_err(|e| anyhow!(e)))
                .transpose()
                .context("NORMALIZER must be 'heuristic' or 'balanced'")?
                .unwrap_or_default(),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// Per-attempt timeout for the LLM client. Defaults to a third of the overall
/// budget; a requested value that would leave no room for a retry is ignored.
fn attempt_timeout(completion: Duration, requested: Option<Duration>) -> Duration {
    requested
        .filter(|t| !t.is_zero() && *t < completion)
        .unwrap_or(completion / 3)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}
