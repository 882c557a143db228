//! Configuration loading, validation, and management for ragweed.
//!
//! Loads configuration from `~/.ragweed/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ragweed/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the chat/embedding backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model spec: "<backend>:<model>", e.g. "openai:gpt-4o-mini" or
    /// "groq:llama-3.1-8b-instant"
    #[serde(default = "default_model")]
    pub model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Turn loop configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session store configuration
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_model() -> String {
    "openai:gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("sessions", &self.sessions)
            .field("retrieval", &self.retrieval)
            .field("tools", &self.tools)
            .finish()
    }
}

/// Turn loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per turn before the loop guard trips
    #[serde(default = "default_max_model_calls")]
    pub max_model_calls: u32,
}

fn default_max_model_calls() -> u32 {
    8
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_model_calls: default_max_model_calls(),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Maximum live sessions; least-recently-active is evicted beyond this
    #[serde(default = "default_session_capacity")]
    pub capacity: usize,

    /// Sessions idle longer than this are evicted (0 = never)
    #[serde(default = "default_idle_ttl_minutes")]
    pub idle_ttl_minutes: u64,
}

fn default_session_capacity() -> usize {
    1024
}
fn default_idle_ttl_minutes() -> u64 {
    720
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            capacity: default_session_capacity(),
            idle_ttl_minutes: default_idle_ttl_minutes(),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks returned per retrieval query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Embedding model used to index and query documents
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_top_k() -> usize {
    5
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            embedding_model: default_embedding_model(),
        }
    }
}

/// Built-in tool settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tavily API key for web search (TAVILY_API_KEY overrides)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_api_key: Option<String>,

    /// Character budget for Wikipedia/arXiv summaries sent to the model
    #[serde(default = "default_summary_chars")]
    pub summary_max_chars: usize,

    /// Result count for web search
    #[serde(default = "default_search_results")]
    pub search_max_results: usize,
}

fn default_summary_chars() -> usize {
    200
}
fn default_search_results() -> usize {
    3
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("tavily_api_key", &redact(&self.tavily_api_key))
            .field("summary_max_chars", &self.summary_max_chars)
            .field("search_max_results", &self.search_max_results)
            .finish()
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            summary_max_chars: default_summary_chars(),
            search_max_results: default_search_results(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ragweed/config.toml).
    ///
    /// Also checks environment variables:
    /// - `RAGWEED_API_KEY` (highest priority), then `OPENAI_API_KEY`,
    ///   then `GROQ_API_KEY`
    /// - `RAGWEED_MODEL` overrides the model spec
    /// - `TAVILY_API_KEY` overrides the web search key
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("RAGWEED_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("GROQ_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("RAGWEED_MODEL") {
            config.model = model;
        }

        if let Ok(key) = std::env::var("TAVILY_API_KEY") {
            config.tools.tavily_api_key = Some(key);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragweed")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !self.model.contains(':') {
            return Err(ConfigError::ValidationError(format!(
                "model must be '<backend>:<model>', got '{}'",
                self.model
            )));
        }

        if self.agent.max_model_calls == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_model_calls must be at least 1".into(),
            ));
        }

        if self.sessions.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.capacity must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            sessions: SessionsConfig::default(),
            retrieval: RetrievalConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
