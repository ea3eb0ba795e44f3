//! Conversation history
//!
//! The orchestrator itself is stateless; callers load prior messages from a
//! [`HistoryStore`] and persist the new user/assistant pair after a turn.

mod store;
mod memory;

pub use store::{to_conversation, HistoryError, HistoryResult, HistoryStore, StoredMessage, ThreadInfo};
pub use memory::MemoryHistoryStore;
