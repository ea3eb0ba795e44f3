//! Logger backed by the `tracing` ecosystem
//!
//! Events are emitted under the `llmchat_core` target so a subscriber filter
//! such as `llmchat_core=debug` selects them.

use super::traits::Logger;

/// A logger that forwards every message to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "llmchat_core", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "llmchat_core", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "llmchat_core", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "llmchat_core", "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tracing_logger_without_subscriber() {
        // No subscriber installed: events are dropped, nothing panics
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
