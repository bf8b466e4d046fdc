//! Server configuration loaded from the environment

use crate::gateway::{RateLimitConfig, DEFAULT_SYSTEM_PROMPT};
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];
const DEFAULT_WINDOW_MS: u64 = 15 * 60 * 1000;
const DEFAULT_MAX_REQUESTS: u32 = 100;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a valid value: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub system_prompt: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub upstream_timeout: Duration,
    pub trust_proxy: bool,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let allowed_origins = get("ALLOWED_ORIGINS").map_or_else(
            || DEFAULT_ALLOWED_ORIGINS.iter().map(ToString::to_string).collect(),
            |raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(ToString::to_string)
                    .collect()
            },
        );

        let window_ms: u64 = parse_positive(
            get("RATE_LIMIT_WINDOW_MS"),
            "RATE_LIMIT_WINDOW_MS",
            DEFAULT_WINDOW_MS,
        )?;
        let max_requests: u32 =
            parse_positive(get("RATE_LIMIT_MAX"), "RATE_LIMIT_MAX", DEFAULT_MAX_REQUESTS)?;
        let timeout_secs: u64 = parse_positive(
            get("UPSTREAM_TIMEOUT_SECS"),
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        )?;
        let port: u16 = parse_positive(get("PORT"), "PORT", DEFAULT_PORT)?;

        let trust_proxy = match get("TRUST_PROXY")
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None | Some("0" | "false" | "no") => false,
            Some("1" | "true" | "yes") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "TRUST_PROXY",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            system_prompt: get("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            allowed_origins,
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(window_ms),
                max_requests,
            },
            upstream_timeout: Duration::from_secs(timeout_secs),
            trust_proxy,
            port,
        })
    }
}

fn parse_positive<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}
