use std::fmt;

use anyhow::{bail, Context, Result};

use crate::assistant::sessions::{DEFAULT_IDLE_TTL_SECS, DEFAULT_MAX_SESSIONS};

/// Backend used when neither an override nor an environment is configured.
pub const FALLBACK_API_URL: &str = "https://pasteur-medicheck-backend.onrender.com/api";
const DEVELOPMENT_API_URL: &str = "http://127.0.0.1:8000/api";
const PRODUCTION_API_URL: &str = "https://pasteur-medicheck-backend.onrender.com/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }

    fn default_api_url(self) -> &'static str {
        match self {
            AppEnv::Development => DEVELOPMENT_API_URL,
            AppEnv::Production => PRODUCTION_API_URL,
        }
    }
}

/// Where the backend base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiUrlSource {
    Override,
    Environment(AppEnv),
    Fallback,
}

impl fmt::Display for ApiUrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiUrlSource::Override => write!(f, "MEDICHECK_API_URL"),
            ApiUrlSource::Environment(env) => write!(f, "APP_ENV={env:?}"),
            ApiUrlSource::Fallback => write!(f, "built-in fallback"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_url_source: ApiUrlSource,
    pub port: u16,
    pub rust_log: String,
    pub backend_timeout_secs: u64,
    pub chat_max_sessions: usize,
    pub chat_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let app_env = optional_env("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .transpose()?;
        let (api_base_url, api_url_source) =
            resolve_api_base(optional_env("MEDICHECK_API_URL").as_deref(), app_env);

        Ok(Config {
            api_base_url,
            api_url_source,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            backend_timeout_secs: std::env::var("BACKEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("BACKEND_TIMEOUT_SECS must be a whole number of seconds")?,
            chat_max_sessions: optional_env("CHAT_MAX_SESSIONS")
                .map(|v| v.trim().parse::<usize>())
                .transpose()
                .context("CHAT_MAX_SESSIONS must be a positive integer")?
                .unwrap_or(DEFAULT_MAX_SESSIONS),
            chat_idle_ttl_secs: optional_env("CHAT_IDLE_TTL_SECS")
                .map(|v| v.trim().parse::<u64>())
                .transpose()
                .context("CHAT_IDLE_TTL_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_IDLE_TTL_SECS),
        })
    }
}

/// Picks the backend base URL: explicit override > environment default > fallback.
///
/// A blank override counts as unset. Trailing slashes are removed.
pub fn resolve_api_base(override_url: Option<&str>, app_env: Option<AppEnv>) -> (String, ApiUrlSource) {
    let (url, source) = match (override_url.map(str::trim).filter(|u| !u.is_empty()), app_env) {
        (Some(url), _) => (url, ApiUrlSource::Override),
        (None, Some(env)) => (env.default_api_url(), ApiUrlSource::Environment(env)),
        (None, None) => (FALLBACK_API_URL, ApiUrlSource::Fallback),
    };
    (url.trim_end_matches('/').to_string(), source)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
