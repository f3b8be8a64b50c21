//! tusk-store - Content-addressed persistence for captured memories.
//!
//! Each captured memory is one markdown file named by the fingerprint of its
//! normalized text. The exclusive create on write is the only concurrency
//! control: it gives at-most-once semantics per identifier even when separate
//! processes capture the same fact, with no lock and no in-memory registry.

pub mod fingerprint;

pub use fingerprint::fingerprint;

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Errors from capture persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No usable capture directory")]
    InvalidCaptureDir,
}

/// File-based memory store addressed by content fingerprint.
pub struct CaptureStore {
    dir: PathBuf,
}

impl CaptureStore {
    /// Create a store rooted at the given directory. Nothing touches the
    /// filesystem until [`CaptureStore::init`] or a store call.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the capture artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the capture directory exists. Idempotent.
    pub async fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn artifact_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.md"))
    }

    /// Persist one captured text, keyed by its content fingerprint.
    ///
    /// Returns `Ok(true)` when a new artifact was written, `Ok(false)` when an
    /// artifact with the same identifier already exists. The already-exists
    /// case is the dedup mechanism working, not a fault; any other I/O failure
    /// propagates. The artifact embeds the identifier and a capture timestamp
    /// as provenance, then the verbatim trimmed text.
    pub async fn store(&self, text: &str) -> Result<bool, StoreError> {
        let trimmed = text.trim();
        let id = fingerprint(trimmed);
        let path = self.artifact_path(&id);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let captured_at = Utc::now().to_rfc3339();
        let content = format!("---\nid: {id}\ncaptured_at: {captured_at}\n---\n\n{trimmed}\n");
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;

        Ok(true)
    }
}
