//! Credential source seam

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretStoreError {
    /// Writes are not supported (environment-backed stores)
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Where model-provider API keys come from
///
/// `ChatSettings::resolve_api_key` asks the store for the provider name
/// (`openai`, `anthropic`, ...). Stores may also accept a raw variable name
/// such as `OPENAI_API_KEY`; an empty value counts as absent.
pub trait SecretStore: Send + Sync {
    /// Short label reported by `ChainSecretStore::source_of`
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<String>;

    /// Fails with [`SecretStoreError::ReadOnly`] on stores that only read
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
