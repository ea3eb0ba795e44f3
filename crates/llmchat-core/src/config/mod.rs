//! Configuration
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (user/workspace level)
//!
//! Environment variables are overlaid on top with [`ChatSettings::apply_env`].

mod settings;
mod traits;
mod memory;
mod file;

pub use settings::{
    ChatSettings, DEFAULT_CLIENT_NAME, DEFAULT_HANDSHAKE_TIMEOUT_SECS, DEFAULT_MAX_TOOL_ROUNDS,
    DEFAULT_MODEL, DEFAULT_PROVIDER, DEFAULT_TURN_TIMEOUT_SECS,
};
pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigLevel};
