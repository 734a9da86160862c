use std::path::PathBuf;

/// Which corpus files are eligible for ingestion.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// File extensions to ingest.
    pub extensions: Vec<String>,
    /// Metadata and report artifacts that live inside corpus directories
    /// but are not intelligence documents.
    pub excluded_files: Vec<String>,
    /// Directories never descended into.
    pub excluded_dirs: Vec<String>,
    /// Documents shorter than this are skipped, not processed.
    pub min_content_len: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string(), "md".to_string()],
            excluded_files: vec![
                "README.md".to_string(),
                "INDEX.md".to_string(),
                "SUMMARY.md".to_string(),
                "ingest_report.md".to_string(),
            ],
            excluded_dirs: vec![".git".to_string(), ".hg".to_string(), ".svn".to_string()],
            min_content_len: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub corpus: CorpusConfig,
    /// Bounded worker pool size for document processing.
    pub workers: usize,
    /// Fixed delay after each document's extraction-service call. Simple
    /// fixed-interval throttle; a token bucket is the upgrade path if the
    /// service starts pushing back.
    pub throttle_ms: u64,
    /// Ledger flush cadence in documents; bounds reprocessing after a crash.
    pub ledger_flush_every: usize,
    /// Skip documents already recorded as processed in the ledger.
    pub skip_processed: bool,
    pub ledger_path: PathBuf,
    pub audit_log_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            workers: 4,
            throttle_ms: 200,
            ledger_flush_every: 25,
            skip_processed: true,
            ledger_path: PathBuf::from("data/ledger.json"),
            audit_log_path: PathBuf::from("data/audit.jsonl"),
        }
    }
}
