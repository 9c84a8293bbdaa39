//! Startup configuration for codemender.
//!
//! Credentials and service endpoints are collected once at startup and
//! passed by reference into each component constructor. Both API keys are
//! required; a missing key is a fatal startup condition, not a runtime
//! error.

use std::env;

use crate::error::ConfigError;

/// Default Groq API base URL (OpenAI-compatible).
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default chat-completion model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Process-wide configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Groq API key for the chat-completion service.
    pub groq_api_key: String,
    /// Tavily API key for the web-search service.
    pub tavily_api_key: String,
    /// Base URL for the chat-completion API.
    pub api_base: String,
    /// Model identifier used for script generation.
    pub model: String,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Reads the following:
    /// - `GROQ_API_KEY`: chat-completion credential (required)
    /// - `TAVILY_API_KEY`: web-search credential (required)
    /// - `GROQ_API_BASE`: API base URL (defaults to the Groq endpoint)
    /// - `CODEMENDER_MODEL`: model identifier (defaults to
    ///   `llama-3.3-70b-versatile`)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` when either API key is
    /// absent or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let groq_api_key = require_env("GROQ_API_KEY")?;
        let tavily_api_key = require_env("TAVILY_API_KEY")?;
        let api_base = env::var("GROQ_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = env::var("CODEMENDER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            groq_api_key,
            tavily_api_key,
            api_base,
            model,
        })
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Reads a required environment variable, treating blank values as absent.
fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingCredential(name)),
    }
}
