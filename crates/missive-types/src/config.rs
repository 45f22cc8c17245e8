//! Configuration types for Missive.
//!
//! `AppConfig` represents the top-level `config.toml`. Every section and
//! field has a default so an empty (or missing) file yields a working setup.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage settings. `url` is resolved against the data directory when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// API keys accepted by the read endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_keys: Vec<String>,
}

/// Content filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_forbidden_words")]
    pub forbidden_words: Vec<String>,
}

fn default_forbidden_words() -> Vec<String> {
    ["spam", "malware", "virus", "hack", "phishing"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            forbidden_words: default_forbidden_words(),
        }
    }
}

/// Page size defaults applied to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Used when the requested limit is below 1.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Upper bound for any requested limit.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    10
}

fn default_max_limit() -> u32 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

/// Input validation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// When true, `message_id` and `timestamp` are required in addition to
    /// `session_id`, `content` and `sender`.
    #[serde(default)]
    pub strict: bool,
}

/// Real-time broadcast settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Broadcast channel capacity; slow subscribers beyond this lag.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    1024
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
