//! Runtime configuration.
//!
//! All LLM-facing knobs live in one explicit struct that is passed to the
//! components that need it; there is no ambient global configuration.
//! Defaults are conservative: `gpt-4o-mini`, temperature 0, at most 20
//! conversation rounds.

use std::time::Duration;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::providers::CompletionConfig;

/// Errors from parsing runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid duration for '{field}': {source}")]
    InvalidDuration {
        field: &'static str,
        source: humantime::DurationError,
    },

    #[error("invalid value for '{field}'")]
    InvalidField { field: &'static str },
}

/// Cache sizing for the completion cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum cached completions
    pub max_entries: u64,

    /// Time-to-live per entry
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Configuration for the query runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model to use for all agents
    pub model: String,

    /// Maximum tokens per completion
    pub max_tokens: u32,

    /// Temperature (0.0 for deterministic)
    pub temperature: f32,

    /// HTTP timeout for a single provider request
    pub request_timeout: Duration,

    /// Timeout for one agent stage (including retries)
    pub agent_timeout: Duration,

    /// Global token budget for one query run
    pub global_max_tokens: u32,

    /// Token budget per agent for one query run
    pub per_agent_max_tokens: u32,

    /// Maximum LLM rounds per query run
    pub max_rounds: u32,

    /// Completion cache sizing
    pub cache: CacheConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            temperature: 0.0,
            request_timeout: Duration::from_secs(15),
            agent_timeout: Duration::from_secs(30),
            global_max_tokens: 20_000,
            per_agent_max_tokens: 8_000,
            max_rounds: 20,
            cache: CacheConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create a config with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Parse a config from JSON, using defaults for absent fields.
    ///
    /// Durations are human-readable strings (`"15s"`, `"1m"`).
    pub fn from_json(value: &JsonValue) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            model: value["model"]
                .as_str()
                .map(str::to_string)
                .unwrap_or(defaults.model),
            max_tokens: u32_field(value, "max_tokens", defaults.max_tokens)?,
            temperature: value["temperature"]
                .as_f64()
                .map(|t| t as f32)
                .unwrap_or(defaults.temperature),
            request_timeout: duration_field(value, "request_timeout", defaults.request_timeout)?,
            agent_timeout: duration_field(value, "agent_timeout", defaults.agent_timeout)?,
            global_max_tokens: u32_field(value, "global_max_tokens", defaults.global_max_tokens)?,
            per_agent_max_tokens: u32_field(
                value,
                "per_agent_max_tokens",
                defaults.per_agent_max_tokens,
            )?,
            max_rounds: u32_field(value, "max_rounds", defaults.max_rounds)?,
            cache: CacheConfig {
                max_entries: value["cache_max_entries"]
                    .as_u64()
                    .unwrap_or(defaults.cache.max_entries),
                ttl: duration_field(value, "cache_ttl", defaults.cache.ttl)?,
            },
        })
    }

    /// The completion config sent with every provider call.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.request_timeout,
        }
    }
}

fn duration_field(
    value: &JsonValue,
    field: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value[field].as_str() {
        Some(text) => humantime::parse_duration(text)
            .map_err(|source| ConfigError::InvalidDuration { field, source }),
        None => Ok(default),
    }
}

fn u32_field(value: &JsonValue, field: &'static str, default: u32) -> Result<u32, ConfigError> {
    match &value[field] {
        JsonValue::Null => Ok(default),
        v => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(ConfigError::InvalidField { field }),
    }
}
