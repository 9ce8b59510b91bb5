//! Configuration module for listing-service.

use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://data/listing.sqlite`.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Empty when no key is configured; generation then falls back to filler text.
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_completion_tokens: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn has_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }
}

/// Kept apart from the legacy camelCase `data/db.sqlite` store, whose
/// tables the migrations would otherwise skip.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/listing.sqlite";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

impl ListingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "listing-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 1)?,
            },
            llm: LlmConfig {
                api_key: Secret::new(env::var("GROQ_API_KEY").unwrap_or_default()),
                model: env::var("GROQ_MODEL")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                base_url: env::var("GROQ_BASE_URL")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
                temperature: parse_env("LLM_TEMPERATURE", 1.5)?,
                top_p: parse_env("LLM_TOP_P", 1.0)?,
                max_completion_tokens: parse_env("LLM_MAX_COMPLETION_TOKENS", 10_500)?,
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            },
        })
    }
}

/// Read `key` and parse it, using `default` when unset. Malformed values are errors.
fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}
