// src/config.rs
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::StartupError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CATALOG_URL: &str = "https://book-service-6t5i.onrender.com/api/books";
pub const DEFAULT_KNOWLEDGE_FILE: &str = "knowledge.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub gemini_base_url: String,
    pub catalog_url: String,
    pub knowledge_file: PathBuf,
    pub upstream_timeout: Duration,
}

impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("catalog_url", &self.catalog_url)
            .field("knowledge_file", &self.knowledge_file)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY")
            .ok_or_else(|| StartupError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| StartupError::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                StartupError::Config(format!("UPSTREAM_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            catalog_url: get("CATALOG_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            knowledge_file: get("KNOWLEDGE_FILE")
                .unwrap_or_else(|| DEFAULT_KNOWLEDGE_FILE.to_string())
                .into(),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
