//! tusk - Memory recall and auto-capture plugin for agent hosts.
//!
//! Sits between host lifecycle events and an external semantic search
//! engine. On prompt-build it decides whether to query memory, frames the
//! results as an untrusted-content block, and hands the host a directive to
//! prepend. On conversation-end it harvests durable facts from user text and
//! persists them content-addressably, at most once per distinct fact.
//!
//! The host supplies two things: a raw config value and a [`MemorySearch`]
//! implementation (the query side of its retrieval index). Everything else,
//! including failure handling, stays inside the plugin; neither handler ever
//! propagates an error.

mod capture_run;
mod plugin;

pub use plugin::MemoryPlugin;

// Re-export the contract types hosts need to implement and consume.
pub use tusk_core::{
    ChatMessage, ContentBlock, MEMORY_BLOCK_CLOSE, MEMORY_BLOCK_OPEN, MemorySearch, MemorySnippet,
    MessageContent, PromptDirective, Role, SEARCH_TOOL_NAME, SearchError, SearchRequest, Settings,
    ToolResponse,
};
pub use tusk_store::{CaptureStore, StoreError, fingerprint};
