//! Configuration loader for Missive.
//!
//! Reads `config.toml` (from `--config` or the data directory, `~/.missive/`
//! in production) into [`AppConfig`], then applies `MISSIVE_*` environment
//! overrides. Falls back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use missive_types::config::AppConfig;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `MISSIVE_DATA_DIR` environment variable
/// 2. `~/.missive`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MISSIVE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".missive");
    }

    // Last resort: current directory
    PathBuf::from(".missive")
}

/// Load configuration from `explicit` or `{data_dir}/config.toml`, then apply
/// environment overrides.
///
/// - If the file does not exist, defaults are used.
/// - If the file exists but fails to parse, logs a warning and uses defaults.
pub async fn load_config(data_dir: &Path, explicit: Option<&Path>) -> AppConfig {
    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join("config.toml"));

    let mut config = read_config_file(&config_path).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

async fn read_config_file(config_path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply `MISSIVE_DATABASE_URL`, `MISSIVE_API_KEYS` and
/// `MISSIVE_FORBIDDEN_WORDS` (the last two comma separated).
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("MISSIVE_DATABASE_URL").filter(|v| !v.trim().is_empty()) {
        config.database.url = Some(url.trim().to_string());
    }
    if let Some(keys) = lookup("MISSIVE_API_KEYS") {
        config.auth.api_keys = split_list(&keys);
    }
    if let Some(words) = lookup("MISSIVE_FORBIDDEN_WORDS") {
        config.content.forbidden_words = split_list(&words);
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// The configured database URL, or `sqlite://{data_dir}/missive.db?mode=rwc`.
pub fn database_url(config: &AppConfig, data_dir: &Path) -> String {
    match &config.database.url {
        Some(url) => url.clone(),
        None => format!("sqlite://{}?mode=rwc", data_dir.join("missive.db").display()),
    }
}
