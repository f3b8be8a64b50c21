//! tusk-core - Decision logic for memory recall and auto-capture (no I/O deps)
//!
//! This crate holds everything that decides, classifies, and renders: settings
//! resolution, the recall gates in front of the external search collaborator,
//! the untrusted-content safety framing, and the heuristic capture classifier.
//! It is intentionally free of filesystem and runtime dependencies; persistence
//! lives in `tusk-store` and host wiring in `tusk`.

pub mod capture;
pub mod error;
pub mod framer;
pub mod recall;
pub mod settings;
pub mod transcript;

// Re-export main types at crate root
pub use capture::{CaptureCandidate, classify, extract_candidates};
pub use error::SearchError;
pub use framer::{MEMORY_BLOCK_CLOSE, MEMORY_BLOCK_OPEN, MEMORY_PREAMBLE, render_block};
pub use recall::{
    MemorySearch, MemorySnippet, PromptDirective, SEARCH_TOOL_NAME, SearchRequest, ToolResponse,
    recall_for_prompt,
};
pub use settings::Settings;
pub use transcript::{ChatMessage, ContentBlock, MessageContent, Role};
