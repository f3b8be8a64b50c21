//! Error types for the recall pipeline.

/// Errors raised by a [`crate::recall::MemorySearch`] collaborator.
///
/// These never escape an event handler: the orchestrator catches them,
/// logs a warning, and degrades to "no injection".
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Tool call failed for '{tool}': {reason}")]
    ToolCallFailed { tool: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),
}
