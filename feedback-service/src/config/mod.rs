use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const SERVICE_NAME: &str = "feedback-service";

const DEFAULT_DATABASE_URL: &str = "sqlite://feedback.db";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub common: core_config::Config,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub gemini: GeminiConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://feedback.db` or `sqlite::memory:`.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Isolated single-connection store, used by tests.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl FeedbackConfig {
    /// Load from the process environment (and `.env`).
    ///
    /// Fails when `GEMINI_API_KEY` is absent: the service must not start
    /// serving without a credential for the model.
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(FeedbackConfig {
            common,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: non_empty(env::var("OTLP_ENDPOINT").ok()),
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", Some(DEFAULT_DATABASE_URL), is_prod)?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5, is_prod)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 1, is_prod)?,
            },
            gemini: GeminiConfig {
                api_key: Secret::new(get_env("GEMINI_API_KEY", None, is_prod)?),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                temperature: parse_env("GEMINI_TEMPERATURE", 0.2, is_prod)?,
                timeout_secs: parse_env("GEMINI_TIMEOUT_SECS", DEFAULT_GEMINI_TIMEOUT_SECS, is_prod)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr + ToString,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(&default.to_string()), is_prod)?;
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

/// Unset and blank both mean "not configured".
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma separated origin list, dropping empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}
