//! Model clients
//!
//! ## Architecture
//!
//! The orchestrator talks to a [`ModelClient`]: one request in, candidate
//! replies out. `GenaiModelClient` covers every provider the `genai` crate
//! speaks (plus OpenAI-compatible endpoints via its `ServiceTargetResolver`);
//! `MockModelClient` serves tests and offline runs.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{CompletionRequest, CompletionResponse, ModelClient, SharedModelClient};
pub use error::{ProviderError, ProviderResult};
pub use genai_provider::GenaiModelClient;
pub use genai_adapter::requires_api_key;
pub use mock::{MockMode, MockModelClient};

use std::sync::Arc;

use crate::config::ChatSettings;
use crate::logging::SharedLogger;
use crate::secrets::SecretStore;

/// Create the model client selected by `settings.provider`
///
/// `mock` yields an echoing [`MockModelClient`]; anything else goes through genai.
pub fn create_model_client(
    settings: &ChatSettings,
    secrets: &dyn SecretStore,
    logger: SharedLogger,
) -> SharedModelClient {
    match settings.provider.to_lowercase().as_str() {
        "mock" => Arc::new(MockModelClient::echo(logger)),
        _ => Arc::new(GenaiModelClient::from_settings(settings, secrets, logger)),
    }
}
