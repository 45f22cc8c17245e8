//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! The message service is generic over its repository, but AppState pins it to
//! the SQLite implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use missive_core::event::EventBus;
use missive_core::service::MessageService;
use missive_infra::config::{database_url, load_config, resolve_data_dir};
use missive_infra::crypto::hash::ApiKeySet;
use missive_infra::sqlite::message::SqliteMessageRepository;
use missive_infra::sqlite::pool::DatabasePool;
use missive_types::config::AppConfig;

/// Concrete type alias for the service generic pinned to the infra implementation.
pub type ConcreteMessageService = MessageService<SqliteMessageRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub message_service: Arc<ConcreteMessageService>,
    pub event_bus: EventBus,
    pub api_keys: Arc<ApiKeySet>,
    pub config: Arc<AppConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir, config_path).await;
        Self::from_config(config, data_dir).await
    }

    /// Wire services from an already-loaded configuration.
    pub async fn from_config(config: AppConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let db_url = database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url)
            .await
            .with_context(|| format!("failed to open database at {db_url}"))?;

        let message_service =
            MessageService::with_config(SqliteMessageRepository::new(db_pool.clone()), &config);
        let api_keys = ApiKeySet::new(&config.auth.api_keys);
        if api_keys.is_empty() {
            tracing::warn!("No API keys configured; authenticated endpoints will reject every request");
        }

        Ok(Self {
            message_service: Arc::new(message_service),
            event_bus: EventBus::new(config.events.capacity),
            api_keys: Arc::new(api_keys),
            config: Arc::new(config),
            db_pool,
        })
    }
}
