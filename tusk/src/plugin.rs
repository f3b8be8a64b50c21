//! The host-facing memory plugin.
//!
//! One instance per host process. Both event handlers resolve on every path
//! and never propagate an error: a failed recall means the prompt goes out
//! without memories, a failed capture means a log line and nothing else.

use crate::capture_run::run_capture;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tusk_core::recall::{MemorySearch, PromptDirective, recall_for_prompt};
use tusk_core::settings::Settings;
use tusk_core::transcript::ChatMessage;

/// Memory recall and auto-capture, wired to host lifecycle events.
pub struct MemoryPlugin {
    settings: Settings,
    search: Arc<dyn MemorySearch>,
    capture_dir: Option<PathBuf>,
}

impl MemoryPlugin {
    /// Build a plugin from the host's raw config object and its search
    /// collaborator.
    ///
    /// The config object supplies the settings fields plus `workspace_root`;
    /// captures land in `<workspace_root>/.tusk/memories`, falling back to
    /// `~/.tusk/memories` when no workspace root is configured.
    pub fn new(raw_config: &Value, search: Arc<dyn MemorySearch>) -> Self {
        Self {
            settings: Settings::resolve(raw_config),
            search,
            capture_dir: derive_capture_dir(raw_config),
        }
    }

    /// The resolved settings this plugin runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Where captures are stored, if a directory could be derived.
    pub fn capture_dir(&self) -> Option<&Path> {
        self.capture_dir.as_deref()
    }

    /// Prompt-build event: decide whether to prepend recalled memories.
    ///
    /// Returns `None` on every gate, failure, or no-result path; the host
    /// prepends `prepend_context` when a directive comes back.
    pub async fn on_prompt_build(
        &self,
        session_id: &str,
        prompt: &str,
    ) -> Option<PromptDirective> {
        let directive = recall_for_prompt(prompt, &self.settings, self.search.as_ref()).await;
        if directive.is_some() {
            tracing::debug!("prepending recalled memories for session {}", session_id);
        }
        directive
    }

    /// Conversation-end event: harvest memorable user text. Side effect only.
    ///
    /// Capture runs whether or not the conversation succeeded; a fact the
    /// user stated is worth keeping either way.
    pub async fn on_conversation_end(
        &self,
        session_id: &str,
        success: bool,
        transcript: &[ChatMessage],
    ) {
        if !self.settings.auto_capture {
            return;
        }
        tracing::debug!(
            "conversation {} ended (success={}), scanning for memorable text",
            session_id,
            success,
        );
        match run_capture(
            self.capture_dir.as_deref(),
            transcript,
            self.settings.capture_max_per_run,
        )
        .await
        {
            Ok(outcome) => {
                if outcome.attempted > 0 {
                    tracing::debug!(
                        "memory capture for session {}: {} stored of {} attempted",
                        session_id,
                        outcome.stored,
                        outcome.attempted,
                    );
                }
            }
            Err(err) => {
                tracing::warn!("memory capture skipped for session {}: {}", session_id, err);
            }
        }
    }
}

fn derive_capture_dir(raw_config: &Value) -> Option<PathBuf> {
    let root = raw_config
        .get("workspace_root")
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .or_else(dirs::home_dir)?;
    Some(root.join(".tusk").join("memories"))
}
