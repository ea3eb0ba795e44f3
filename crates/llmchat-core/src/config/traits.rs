//! Configuration provider trait

use async_trait::async_trait;

use super::settings::ChatSettings;

/// Source of [`ChatSettings`]
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file (~/.config/llmchat/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load the settings; a missing source yields defaults
    async fn load(&self) -> ConfigResult<ChatSettings>;

    /// Persist the settings
    async fn save(&self, settings: &ChatSettings) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
