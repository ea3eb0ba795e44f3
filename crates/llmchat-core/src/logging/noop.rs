//! Logger that drops every line

use std::sync::Arc;

use super::traits::{Logger, SharedLogger};

/// Drops every line
///
/// What components are built with in unit tests, and what an embedder passes
/// when it has no log sink of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    /// Ready to hand to `ToolGateway::new`, `ThreadChat::new` and friends
    pub fn shared() -> SharedLogger {
        Arc::new(NoOpLogger)
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn warn(&self, _: &str) {}
    fn error(&self, _: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InProcessEndpoint, ToolGateway};
    use crate::server::ToolServer;

    #[test]
    fn test_components_accept_shared_noop() {
        let server = ToolServer::new("quiet", "0.1.0", NoOpLogger::shared());
        let gateway = ToolGateway::new(Arc::new(InProcessEndpoint::new(Arc::new(server))), NoOpLogger::shared());
        assert!(!gateway.is_ready());
    }
}
