//! Conversation-end capture driver.
//!
//! Walks the transcript's user messages, classifies their text, and attempts
//! at most the per-run cap of storage writes, sequentially in extraction
//! order. Sequential attempts keep the cap deterministic and avoid racing two
//! creates for the same identifier inside one batch.

use std::path::Path;
use tusk_core::capture::extract_candidates;
use tusk_core::transcript::{ChatMessage, Role};
use tusk_store::{CaptureStore, StoreError};

/// What one capture run did. Attempts count capped candidates that reached
/// the store, whether or not they were new.
#[derive(Debug, Default)]
pub(crate) struct CaptureOutcome {
    pub attempted: usize,
    pub stored: usize,
}

pub(crate) async fn run_capture(
    dir: Option<&Path>,
    transcript: &[ChatMessage],
    cap: i64,
) -> Result<CaptureOutcome, StoreError> {
    let dir = dir.ok_or(StoreError::InvalidCaptureDir)?;
    let store = CaptureStore::new(dir.to_path_buf());
    store.init().await?;

    let texts: Vec<&str> = transcript
        .iter()
        .filter(|message| message.role == Role::User)
        .flat_map(|message| message.content.text_parts())
        .collect();
    let candidates = extract_candidates(&texts);

    // A zero or negative cap stores nothing; the resolver passes such values
    // through unclamped.
    let cap = usize::try_from(cap).unwrap_or(0);
    let mut outcome = CaptureOutcome::default();
    for candidate in candidates.into_iter().take(cap) {
        outcome.attempted += 1;
        match store.store(&candidate.text).await {
            Ok(true) => {
                outcome.stored += 1;
                tracing::debug!("captured memory via trigger '{}'", candidate.trigger);
            }
            Ok(false) => {
                tracing::debug!("memory already stored, skipping duplicate");
            }
            Err(err) => {
                tracing::warn!("failed to store memory candidate: {}", err);
            }
        }
    }
    Ok(outcome)
}
