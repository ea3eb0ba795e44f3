//! Logging abstractions
//!
//! Components log through the [`Logger`] trait so embedders can route output
//! wherever they like; [`TracingLogger`] is the default for binaries.

mod traits;
mod noop;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;
