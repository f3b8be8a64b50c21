//! Recall orchestration: decides whether to query memory for a prompt.
//!
//! The semantic search engine is an external collaborator behind
//! [`MemorySearch`]; ranking (similarity, lexical, diversity, recency) is
//! entirely its business. This module owns the gates in front of it and the
//! interpretation of its reply. Absence of memory is never an error: every
//! failure path degrades to `None` so prompt construction always proceeds.

use crate::error::SearchError;
use crate::framer::{self, MEMORY_BLOCK_OPEN};
use crate::settings::Settings;
use crate::transcript::ContentBlock;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tool name the orchestrator invokes on the collaborator.
pub const SEARCH_TOOL_NAME: &str = "memory_search";

/// Query parameters passed to the search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: i64,
    pub min_score: f64,
}

/// Raw collaborator reply: a sequence of typed content blocks, of which the
/// first `text` block carries the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ContentBlock>,
}

/// One ranked search result. Ephemeral: owned by a single recall invocation,
/// never persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnippet {
    /// Opaque identifier of the originating memory artifact.
    pub path: String,
    /// Raw snippet text. Untrusted until the framer has escaped it.
    pub snippet: String,
    /// Similarity score as reported by the collaborator.
    pub score: f64,
    /// Label naming the originating index or collection.
    pub source: String,
}

/// Directive returned to the host: context to prepend to the prompt.
///
/// Prepended, never appended or merged, so injected memory stays structurally
/// separate from user text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDirective {
    pub prepend_context: String,
}

/// External semantic search collaborator, invoked in the call-tool shape.
///
/// Implementations live in the host (an MCP client, an HTTP client, an
/// in-process index). Deadlines and cancellation are the host's concern.
#[async_trait]
pub trait MemorySearch: Send + Sync {
    async fn execute(
        &self,
        tool: &str,
        request: SearchRequest,
    ) -> Result<ToolResponse, SearchError>;
}

/// Expected payload inside the collaborator's first text block. Any shape
/// deviation is treated as "no results", not an error.
#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    results: Vec<MemorySnippet>,
    #[serde(default)]
    disabled: bool,
}

/// Decide whether to inject recalled memories for an incoming prompt.
///
/// Hard gates, short-circuiting in order: empty or too-short prompt, prompt
/// already carrying an injection block, collaborator disabled or empty or
/// unparseable. Only a non-empty, parseable result set is framed and
/// returned. A collaborator error is logged and swallowed.
pub async fn recall_for_prompt(
    prompt: &str,
    settings: &Settings,
    search: &dyn MemorySearch,
) -> Option<PromptDirective> {
    if prompt.is_empty() || (prompt.chars().count() as i64) < settings.min_prompt_length {
        return None;
    }
    if prompt.contains(MEMORY_BLOCK_OPEN) {
        return None;
    }

    let request = SearchRequest {
        query: prompt.to_string(),
        max_results: settings.max_results,
        min_score: settings.min_score,
    };
    let response = match search.execute(SEARCH_TOOL_NAME, request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("memory search failed, continuing without recall: {}", err);
            return None;
        }
    };

    let Some(payload_text) = first_text_block(&response) else {
        tracing::debug!("memory search reply carried no text block");
        return None;
    };
    let payload: SearchPayload = match serde_json::from_str(payload_text) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!("memory search payload did not parse: {}", err);
            return None;
        }
    };
    if payload.disabled || payload.results.is_empty() {
        return None;
    }

    Some(PromptDirective {
        prepend_context: framer::render_block(&payload.results, settings.show_score),
    })
}

fn first_text_block(response: &ToolResponse) -> Option<&str> {
    response.content.iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text.as_str()),
        ContentBlock::Unknown => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::framer::{MEMORY_BLOCK_CLOSE, MEMORY_PREAMBLE};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Payload(&'static str),
        NoTextBlock,
        Fail,
    }

    struct StubSearch {
        calls: AtomicUsize,
        seen: Mutex<Vec<SearchRequest>>,
        reply: Reply,
    }

    impl StubSearch {
        fn new(reply: Reply) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MemorySearch for StubSearch {
        async fn execute(
            &self,
            _tool: &str,
            request: SearchRequest,
        ) -> Result<ToolResponse, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Reply::Payload(text) => Ok(ToolResponse {
                    content: vec![ContentBlock::Text {
                        text: (*text).to_string(),
                    }],
                }),
                Reply::NoTextBlock => Ok(ToolResponse {
                    content: vec![ContentBlock::Unknown],
                }),
                Reply::Fail => Err(SearchError::Transport("connection reset".to_string())),
            }
        }
    }

    const TWO_RESULTS: &str = r#"{
        "results": [
            {"path": "a1b2.md", "snippet": "started a new job at Initech", "score": 0.81, "source": "memories"},
            {"path": "c3d4.md", "snippet": "older note about work", "score": 0.42, "source": "memories"}
        ]
    }"#;

    #[tokio::test]
    async fn test_empty_prompt_never_queries() {
        let search = StubSearch::new(Reply::Payload(TWO_RESULTS));
        let directive = recall_for_prompt("", &Settings::default(), &search).await;
        assert!(directive.is_none());
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_prompt_never_queries() {
        let settings = Settings {
            min_prompt_length: 10,
            ..Settings::default()
        };
        let search = StubSearch::new(Reply::Payload(TWO_RESULTS));
        let directive = recall_for_prompt("hi", &settings, &search).await;
        assert!(directive.is_none());
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_length_counts_chars_not_bytes() {
        let settings = Settings {
            min_prompt_length: 5,
            ..Settings::default()
        };
        // 5 chars, 7 bytes: passes the gate.
        let search = StubSearch::new(Reply::Payload(r#"{"results": []}"#));
        let directive = recall_for_prompt("héllö", &settings, &search).await;
        assert!(directive.is_none());
        assert_eq!(search.call_count(), 1);
    }

    #[tokio::test]
    async fn test_already_injected_prompt_never_queries() {
        let search = StubSearch::new(Reply::Payload(TWO_RESULTS));
        let prompt =
            format!("{MEMORY_BLOCK_OPEN}\nolder block\n{MEMORY_BLOCK_CLOSE}\nwhat's my new job?");
        let directive = recall_for_prompt(&prompt, &Settings::default(), &search).await;
        assert!(directive.is_none());
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_results_are_framed_into_directive() {
        let settings = Settings {
            show_score: true,
            ..Settings::default()
        };
        let search = StubSearch::new(Reply::Payload(TWO_RESULTS));
        let directive = recall_for_prompt("what's my new job?", &settings, &search)
            .await
            .unwrap();

        let block = &directive.prepend_context;
        assert!(block.starts_with(MEMORY_BLOCK_OPEN));
        assert!(block.ends_with(MEMORY_BLOCK_CLOSE));
        assert!(block.contains(MEMORY_PREAMBLE));
        assert!(
            block.contains("1. [memories:a1b2.md][similarity: 81%] started a new job at Initech")
        );
        assert!(block.contains("2. [memories:c3d4.md][similarity: 42%] older note about work"));
    }

    #[tokio::test]
    async fn test_request_carries_resolved_settings() {
        let settings = Settings {
            max_results: 7,
            min_score: 0.6,
            ..Settings::default()
        };
        let search = StubSearch::new(Reply::Payload(r#"{"results": []}"#));
        let directive = recall_for_prompt("what's my new job?", &settings, &search).await;
        assert!(directive.is_none());

        let seen = search.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].query, "what's my new job?");
        assert_eq!(seen[0].max_results, 7);
        assert_eq!(seen[0].min_score, 0.6);
    }

    #[tokio::test]
    async fn test_disabled_collaborator_skips_silently() {
        let search = StubSearch::new(Reply::Payload(r#"{"disabled": true}"#));
        let directive =
            recall_for_prompt("what's my new job?", &Settings::default(), &search).await;
        assert!(directive.is_none());
    }

    #[tokio::test]
    async fn test_zero_results_skip_silently() {
        let search = StubSearch::new(Reply::Payload(r#"{"results": []}"#));
        let directive =
            recall_for_prompt("what's my new job?", &Settings::default(), &search).await;
        assert!(directive.is_none());
    }

    #[tokio::test]
    async fn test_reply_without_text_block_skips() {
        let search = StubSearch::new(Reply::NoTextBlock);
        let directive =
            recall_for_prompt("what's my new job?", &Settings::default(), &search).await;
        assert!(directive.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_payload_skips() {
        let search = StubSearch::new(Reply::Payload("not json at all"));
        let directive =
            recall_for_prompt("what's my new job?", &Settings::default(), &search).await;
        assert!(directive.is_none());
    }

    #[tokio::test]
    async fn test_malformed_results_skip() {
        // Snippet objects missing required fields are a shape deviation.
        let search = StubSearch::new(Reply::Payload(r#"{"results": [{"path": "x"}]}"#));
        let directive =
            recall_for_prompt("what's my new job?", &Settings::default(), &search).await;
        assert!(directive.is_none());
    }

    #[tokio::test]
    async fn test_collaborator_failure_degrades_to_none() {
        let search = StubSearch::new(Reply::Fail);
        let directive =
            recall_for_prompt("what's my new job?", &Settings::default(), &search).await;
        assert!(directive.is_none());
    }
}
