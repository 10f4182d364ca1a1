//! Process-wide configuration
//!
//! Built once at start-up from the environment (after `.env` is loaded)
//! and shared read-only by the data source, completion client and server.

use crate::error::QueryError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fmp_api_key: String,
    pub fmp_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// How many recent transcripts the multi-transcript fetcher asks for
    pub transcript_limit: usize,
    pub request_timeout: Duration,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fmp_api_key: String::new(),
            fmp_base_url: DEFAULT_FMP_BASE_URL.to_string(),
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.2,
            transcript_limit: 3,
            request_timeout: Duration::from_secs(30),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fmp_api_key = get("FMP_API_KEY").unwrap_or_default();
        if fmp_api_key.is_empty() {
            warn!("FMP_API_KEY not set; financial data lookups will fail");
        }

        let openai_api_key = get("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.is_empty() {
            warn!("OPENAI_API_KEY not set; classification and synthesis will fail");
        }

        let config = Self {
            fmp_api_key,
            fmp_base_url: get("FMP_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.fmp_base_url),
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_var(&get, "OPENAI_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            temperature: parse_var(&get, "OPENAI_TEMPERATURE")?.unwrap_or(defaults.temperature),
            transcript_limit: parse_var(&get, "TRANSCRIPT_LIMIT")?
                .unwrap_or(defaults.transcript_limit),
            request_timeout: parse_var::<u64, _>(&get, "HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            port: match parse_var(&get, "PORT")? {
                Some(port) => port,
                None => parse_var(&get, "API_PORT")?.unwrap_or(defaults.port),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.transcript_limit == 0 {
            return Err(QueryError::Config(
                "TRANSCRIPT_LIMIT must be at least 1".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(QueryError::Config(
                "OPENAI_MAX_TOKENS must be at least 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(QueryError::Config(format!(
                "OPENAI_TEMPERATURE must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        for (name, url) in [
            ("FMP_BASE_URL", &self.fmp_base_url),
            ("OPENAI_BASE_URL", &self.openai_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(QueryError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        Ok(())
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                QueryError::Config(format!("{} has invalid value '{}': {}", key, raw, e))
            })
        })
        .transpose()
}
