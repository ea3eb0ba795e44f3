//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Mapping from provider names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", vec!["GROQ_API_KEY"]);
    m.insert("deepseek", vec!["DEEPSEEK_API_KEY"]);
    m.insert("xai", vec!["XAI_API_KEY"]);
    m.insert("ollama", vec![]); // Ollama doesn't need an API key
    m
});

/// Read-only secret store backed by environment variables
///
/// `get("openai")` checks `OPENAI_API_KEY`; any other key is tried as-is and
/// then as `<KEY>_API_KEY`. Empty values count as unset.
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Get the environment variable names for a provider
    pub fn env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(provider.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::read(key) {
            return Some(value);
        }

        if let Some(env_vars) = Self::env_vars_for_provider(key) {
            if let Some(value) = env_vars.iter().find_map(|name| Self::read(name)) {
                return Some(value);
            }
        }

        Self::read(&format!("{}_API_KEY", key.to_uppercase()))
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_store_read_only() {
        let store = EnvSecretStore::new();
        assert_eq!(store.name(), "env");
        assert!(matches!(store.store("test", "value"), Err(SecretStoreError::ReadOnly)));
        assert!(matches!(store.delete("test"), Err(SecretStoreError::ReadOnly)));
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("LLMCHAT_TEST_SECRET_12345", "test_value");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("LLMCHAT_TEST_SECRET_12345"), Some("test_value".to_string()));

        env::remove_var("LLMCHAT_TEST_SECRET_12345");
    }

    #[test]
    fn test_env_store_get_suffixed() {
        env::set_var("LLMCHAT_TESTPROVIDER_API_KEY", "sk-suffixed");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("llmchat_testprovider"), Some("sk-suffixed".to_string()));

        env::remove_var("LLMCHAT_TESTPROVIDER_API_KEY");
    }

    #[test]
    fn test_env_store_mapping() {
        assert_eq!(EnvSecretStore::env_vars_for_provider("OpenAI"), Some(&["OPENAI_API_KEY"][..]));
        assert_eq!(EnvSecretStore::env_vars_for_provider("ollama").map(|v| v.len()), Some(0));
        assert!(EnvSecretStore::env_vars_for_provider("unknown").is_none());
    }

    #[test]
    fn test_env_store_get_not_found() {
        let store = EnvSecretStore::new();
        assert_eq!(store.get("nonexistent_provider_xyz"), None);
    }
}
