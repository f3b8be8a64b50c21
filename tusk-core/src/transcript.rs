//! Role-tagged transcript types exchanged with the host.
//!
//! Hosts differ in how they shape message content: some send a plain string,
//! others a sequence of typed blocks. Both forms deserialize here; only
//! `text` blocks are ever consumed, and unknown block types are tolerated so
//! new host block kinds do not break capture.

use serde::{Deserialize, Serialize};

/// One message of a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// Who authored a message. Only [`Role::User`] text feeds the capture
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// Message content as hosts send it: a bare string or typed blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A typed content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    /// Any block type this crate does not understand.
    #[serde(other)]
    Unknown,
}

impl MessageContent {
    /// The plain-text fragments of this content, in order.
    pub fn text_parts(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => vec![text.as_str()],
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    ContentBlock::Unknown => None,
                })
                .collect(),
        }
    }
}
