//! Gemini configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use lectern_core::{Error, Result, DEFAULT_CHAT_MODEL};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the Gemini client
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create configuration from environment variables
    ///
    /// `.env.txt` is read first, then `.env`; variables already set win.
    pub fn from_env() -> Result<Self> {
        dotenvy::from_filename(".env.txt").ok();
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = get("GOOGLE_API_KEY")
            .or_else(|| get("GEMINI_API_KEY"))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Configuration(
                "GOOGLE_API_KEY or GEMINI_API_KEY environment variable not found".to_string()
            ))?;

        let api_url = get("GEMINI_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let chat_model = get("GEMINI_CHAT_MODEL")
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let embedding_model = get("GEMINI_EMBEDDING_MODEL")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());

        let timeout_secs = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| Error::Configuration(
                format!("GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw)
            ))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            chat_model,
            embedding_model,
            timeout_secs,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Point the client at another base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
