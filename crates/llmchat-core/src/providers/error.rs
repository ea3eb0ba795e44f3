//! Provider error types

use thiserror::Error;

/// Errors that can occur while talking to a model provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No credential for a provider that requires one
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// Request failed at the provider or in transport
    #[error("{provider} API error: {message}")]
    ApiError { provider: String, message: String },

    /// Response could not be interpreted
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn api_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
