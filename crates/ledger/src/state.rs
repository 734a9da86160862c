use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerState {
    processed_document_ids: HashSet<String>,
    failed_document_ids: HashSet<String>,
    last_updated: Option<DateTime<Utc>>,
}

/// Durable record of which corpus documents have been handled.
///
/// The state is flushed atomically (temp file + rename) every `flush_every`
/// mutations and once more at run end, so a crash loses at most
/// `flush_every` documents' worth of bookkeeping — which only costs
/// reprocessing, never duplication, because upserts are idempotent.
///
/// Opening takes an exclusive advisory lock next to the ledger file; a
/// second orchestrator pointed at the same ledger fails fast instead of
/// racing the single-writer state.
pub struct Ledger {
    path: PathBuf,
    state: LedgerState,
    flush_every: usize,
    pending: usize,
    _lock: File,
}

impl Ledger {
    pub async fn open(path: impl AsRef<Path>, flush_every: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let lock_path = path.with_extension("lock");
        let lock = File::options()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open ledger lock {:?}", lock_path))?;
        lock.try_lock_exclusive().with_context(|| {
            format!(
                "Ledger {:?} is locked by another orchestrator instance",
                path
            )
        })?;

        let state = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read ledger {:?}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse ledger {:?}", path))?
        } else {
            LedgerState::default()
        };

        info!(
            ledger = %path.display(),
            processed = state.processed_document_ids.len(),
            failed = state.failed_document_ids.len(),
            "Ledger loaded"
        );

        Ok(Self {
            path,
            state,
            flush_every: flush_every.max(1),
            pending: 0,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_processed(&self, document_id: &str) -> bool {
        self.state.processed_document_ids.contains(document_id)
    }

    pub fn processed_count(&self) -> usize {
        self.state.processed_document_ids.len()
    }

    pub fn failed_count(&self) -> usize {
        self.state.failed_document_ids.len()
    }

    /// Record a successfully handled document. A document that failed in an
    /// earlier run and succeeded now leaves the failed set.
    pub async fn mark_processed(&mut self, document_id: &str) -> Result<()> {
        self.state.processed_document_ids.insert(document_id.to_string());
        self.state.failed_document_ids.remove(document_id);
        self.touch().await
    }

    pub async fn mark_failed(&mut self, document_id: &str) -> Result<()> {
        self.state.failed_document_ids.insert(document_id.to_string());
        self.touch().await
    }

    async fn touch(&mut self) -> Result<()> {
        self.state.last_updated = Some(Utc::now());
        self.pending += 1;
        if self.pending >= self.flush_every {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write the state to disk atomically.
    pub async fn flush(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)
            .context("Failed to serialize ledger state")?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write ledger temp file {:?}", tmp_path))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace ledger {:?}", self.path))?;

        debug!(
            ledger = %self.path.display(),
            processed = self.state.processed_document_ids.len(),
            failed = self.state.failed_document_ids.len(),
            "Ledger flushed"
        );
        self.pending = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        {
            let mut ledger = Ledger::open(&path, 1).await.unwrap();
            ledger.mark_processed("doc-a").await.unwrap();
            ledger.mark_failed("doc-b").await.unwrap();
            ledger.flush().await.unwrap();
        }

        let reopened = Ledger::open(&path, 1).await.unwrap();
        assert!(reopened.is_processed("doc-a"));
        assert!(!reopened.is_processed("doc-b"));
        assert_eq!(reopened.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_flush_cadence_bounds_loss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = Ledger::open(&path, 3).await.unwrap();
        ledger.mark_processed("doc-1").await.unwrap();
        ledger.mark_processed("doc-2").await.unwrap();
        // Two mutations, cadence of three: nothing on disk yet.
        assert!(!path.exists());

        ledger.mark_processed("doc-3").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_success_clears_earlier_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = Ledger::open(&path, 1).await.unwrap();
        ledger.mark_failed("doc-a").await.unwrap();
        ledger.mark_processed("doc-a").await.unwrap();

        assert!(ledger.is_processed("doc-a"));
        assert_eq!(ledger.failed_count(), 0);
    }

    #[tokio::test]
    async fn test_second_instance_is_locked_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let _first = Ledger::open(&path, 1).await.unwrap();
        let second = Ledger::open(&path, 1).await;

        assert!(second.is_err());
    }
}
