//! Chat errors

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::history::HistoryError;
use crate::providers::ProviderError;
use crate::types::Interrupted;

/// Errors that end a turn
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Tool gateway error: {0}")]
    Gateway(GatewayError),

    #[error("Model error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Model kept requesting tools after {max_rounds} rounds")]
    ToolLoopExceeded { max_rounds: u32 },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error("Thread not found: {0}")]
    ThreadNotFound(u64),

    #[error("Message is required")]
    EmptyMessage,

    #[error("History error: {0}")]
    History(HistoryError),
}

impl From<GatewayError> for ChatError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Interrupted(reason) => ChatError::Interrupted(reason),
            other => ChatError::Gateway(other),
        }
    }
}

impl From<HistoryError> for ChatError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::ThreadNotFound(id) => ChatError::ThreadNotFound(id),
            other => ChatError::History(other),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
