use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Terminal state of one document within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processed,
    SkippedTooShort,
    Failed,
}

/// One audit line per document attempted in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub run_id: Uuid,
    pub document_path: String,
    pub document_id: String,
    pub status: DocumentStatus,
    pub entities_extracted: usize,
    pub entities_dropped: usize,
    pub edges_emitted: usize,
    pub edges_written: usize,
    pub edges_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Append-only JSONL audit log. Records are only ever added, never
/// rewritten.
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open audit log {:?}", path))?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub async fn append(&mut self, record: &AuditRecord) -> Result<()> {
        let mut line =
            serde_json::to_string(record).context("Failed to serialize audit record")?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("Failed to append to audit log {:?}", self.path))?;
        self.file
            .flush()
            .await
            .context("Failed to flush audit log")?;

        Ok(())
    }
}
