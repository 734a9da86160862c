use crate::validate::{ValidationReport, ValidationSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    PassedWithWarnings,
    /// The node-preservation invariant failed; the graph may have been
    /// damaged and an operator has to look before anything else runs.
    Critical,
}

/// One per-document failure, kept verbatim for the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureDetail {
    pub document_path: String,
    pub error: String,
}

/// Aggregate result of one orchestrator run. Always produced, even when
/// parts of the corpus failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub documents_discovered: usize,
    /// Skipped by the resume check without touching the extraction service.
    pub documents_already_processed: usize,
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub documents_failed: usize,

    pub entities_extracted: usize,
    pub entities_dropped: usize,
    pub edges_emitted: usize,
    pub edges_written: usize,
    pub edges_skipped: usize,

    /// post.total - pre.total; never negative on a non-critical run.
    pub nodes_added: i64,

    pub pre_snapshot: ValidationSnapshot,
    pub post_snapshot: ValidationSnapshot,
    pub validation: ValidationReport,

    pub failures: Vec<FailureDetail>,
}
