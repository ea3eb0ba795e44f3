//! Gateway errors

use thiserror::Error;

use crate::types::Interrupted;

/// Errors raised by the tool gateway and its channels
///
/// `Clone` so a failed initialization can be handed to every caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Tool gateway is not ready")]
    NotReady,

    #[error("Tool channel closed")]
    ChannelClosed,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
