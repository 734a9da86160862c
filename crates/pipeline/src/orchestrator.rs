use crate::config::PipelineConfig;
use crate::discover::discover_documents;
use crate::summary::{FailureDetail, RunStatus, RunSummary};
use crate::validate::{ValidationReport, ValidationSnapshot};
use anyhow::{Context, Result};
use chrono::Utc;
use enrich::EnrichmentEngine;
use extract::ExtractionService;
use graph::{EdgeAttrs, GraphStore, NodeAttrs, NodeKey};
use ledger::{document_id, AuditLog, AuditRecord, DocumentStatus, Ledger};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct DocStats {
    entities_extracted: usize,
    entities_dropped: usize,
    edges_emitted: usize,
    edges_written: usize,
    edges_skipped: usize,
    detail: Option<String>,
}

#[derive(Debug)]
enum DocOutcome {
    Processed,
    SkippedTooShort,
    Failed(String),
}

struct DocReport {
    path: String,
    document_id: String,
    outcome: DocOutcome,
    stats: DocStats,
}

#[derive(Default)]
struct Tallies {
    processed: usize,
    skipped: usize,
    failed: usize,
    entities_extracted: usize,
    entities_dropped: usize,
    edges_emitted: usize,
    edges_written: usize,
    edges_skipped: usize,
    failures: Vec<FailureDetail>,
}

/// Discovers the corpus, drives extraction → enrichment → relationship
/// inference → graph upsert per document, and validates run-level safety
/// invariants.
///
/// Documents are partitioned across a bounded worker pool; graph upserts
/// are commutative under their identity keys and need no coordination. The
/// ledger and audit log are single-writer resources, so every completion
/// flows through one serializing writer task — the only sequential
/// bottleneck in the run.
pub struct Orchestrator {
    extractor: Arc<dyn ExtractionService>,
    store: Arc<dyn GraphStore>,
    engine: Arc<EnrichmentEngine>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        extractor: Arc<dyn ExtractionService>,
        store: Arc<dyn GraphStore>,
        engine: EnrichmentEngine,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            store,
            engine: Arc::new(engine),
            config,
        }
    }

    pub async fn run(&self, corpus_root: &Path) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let documents = discover_documents(corpus_root, &self.config.corpus)?;
        info!(run_id = %run_id, documents = documents.len(), "Corpus discovered");

        for path in [&self.config.ledger_path, &self.config.audit_log_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create {:?}", parent))?;
                }
            }
        }

        let ledger = Ledger::open(&self.config.ledger_path, self.config.ledger_flush_every).await?;
        let audit = AuditLog::open(&self.config.audit_log_path).await?;

        let pre_snapshot = ValidationSnapshot::capture(self.store.as_ref()).await?;

        let mut documents_already_processed = 0;
        let pending: Vec<_> = documents
            .iter()
            .filter(|path| {
                let id = document_id(&path.to_string_lossy());
                if self.config.skip_processed && ledger.is_processed(&id) {
                    documents_already_processed += 1;
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();

        if documents_already_processed > 0 {
            info!(
                run_id = %run_id,
                resumed_past = documents_already_processed,
                "Resuming: already-processed documents will not be re-extracted"
            );
        }

        let workers = self.config.workers.max(1);
        let (tx, rx) = mpsc::channel::<DocReport>(workers * 2);
        let writer = tokio::spawn(ledger_writer(ledger, audit, run_id, rx));

        let semaphore = Arc::new(Semaphore::new(workers));
        let throttle = Duration::from_millis(self.config.throttle_ms);
        let min_content_len = self.config.corpus.min_content_len;

        let mut handles = Vec::with_capacity(pending.len());
        for path in pending {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("Worker semaphore closed")?;
            let tx = tx.clone();
            let extractor = self.extractor.clone();
            let store = self.store.clone();
            let engine = self.engine.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let path_str = path.to_string_lossy().to_string();
                let id = document_id(&path_str);

                let (outcome, stats) = process_document(
                    &path,
                    extractor.as_ref(),
                    engine.as_ref(),
                    store.as_ref(),
                    min_content_len,
                    throttle,
                )
                .await;

                // A closed channel means the writer already failed; its
                // error surfaces when the writer task is joined below.
                let _ = tx
                    .send(DocReport {
                        path: path_str,
                        document_id: id,
                        outcome,
                        stats,
                    })
                    .await;
            }));
        }
        drop(tx);

        for handle in handles {
            handle.await.context("Document worker panicked")?;
        }
        let tallies = writer.await.context("Ledger writer panicked")??;

        let post_snapshot = ValidationSnapshot::capture(self.store.as_ref()).await?;
        let validation = ValidationReport::check(&pre_snapshot, &post_snapshot);

        let status = if validation.is_critical() {
            error!(
                run_id = %run_id,
                pre_nodes = pre_snapshot.total_node_count,
                post_nodes = post_snapshot.total_node_count,
                "Node count regressed; run is CRITICAL and requires operator review"
            );
            RunStatus::Critical
        } else if !validation.tier_hierarchy {
            warn!(
                tier1 = post_snapshot.tier1_count,
                tier2 = post_snapshot.tier2_count,
                "Tier-2 nodes do not outnumber tier-1 nodes"
            );
            RunStatus::PassedWithWarnings
        } else {
            RunStatus::Passed
        };

        let summary = RunSummary {
            run_id,
            status,
            started_at,
            finished_at: Utc::now(),
            documents_discovered: documents.len(),
            documents_already_processed,
            documents_processed: tallies.processed,
            documents_skipped: tallies.skipped,
            documents_failed: tallies.failed,
            entities_extracted: tallies.entities_extracted,
            entities_dropped: tallies.entities_dropped,
            edges_emitted: tallies.edges_emitted,
            edges_written: tallies.edges_written,
            edges_skipped: tallies.edges_skipped,
            nodes_added: post_snapshot.total_node_count as i64
                - pre_snapshot.total_node_count as i64,
            pre_snapshot,
            post_snapshot,
            validation,
            failures: tallies.failures,
        };

        info!(
            run_id = %run_id,
            processed = summary.documents_processed,
            skipped = summary.documents_skipped,
            failed = summary.documents_failed,
            nodes_added = summary.nodes_added,
            "Run finished"
        );

        Ok(summary)
    }
}

/// Single-writer task for the ledger and audit log. All document outcomes
/// funnel through here so the durable run state never sees concurrent
/// writers.
async fn ledger_writer(
    mut ledger: Ledger,
    mut audit: AuditLog,
    run_id: Uuid,
    mut rx: mpsc::Receiver<DocReport>,
) -> Result<Tallies> {
    let mut tallies = Tallies::default();

    while let Some(report) = rx.recv().await {
        let status = match &report.outcome {
            DocOutcome::Processed => {
                ledger.mark_processed(&report.document_id).await?;
                tallies.processed += 1;
                DocumentStatus::Processed
            }
            DocOutcome::SkippedTooShort => {
                tallies.skipped += 1;
                DocumentStatus::SkippedTooShort
            }
            DocOutcome::Failed(err) => {
                ledger.mark_failed(&report.document_id).await?;
                tallies.failed += 1;
                tallies.failures.push(FailureDetail {
                    document_path: report.path.clone(),
                    error: err.clone(),
                });
                DocumentStatus::Failed
            }
        };

        tallies.entities_extracted += report.stats.entities_extracted;
        tallies.entities_dropped += report.stats.entities_dropped;
        tallies.edges_emitted += report.stats.edges_emitted;
        tallies.edges_written += report.stats.edges_written;
        tallies.edges_skipped += report.stats.edges_skipped;

        let detail = match &report.outcome {
            DocOutcome::Failed(err) => Some(err.clone()),
            _ => report.stats.detail.clone(),
        };

        audit
            .append(&AuditRecord {
                timestamp: Utc::now(),
                run_id,
                document_path: report.path,
                document_id: report.document_id,
                status,
                entities_extracted: report.stats.entities_extracted,
                entities_dropped: report.stats.entities_dropped,
                edges_emitted: report.stats.edges_emitted,
                edges_written: report.stats.edges_written,
                edges_skipped: report.stats.edges_skipped,
                detail,
            })
            .await?;
    }

    ledger.flush().await?;
    Ok(tallies)
}

async fn process_document(
    path: &Path,
    extractor: &dyn ExtractionService,
    engine: &EnrichmentEngine,
    store: &dyn GraphStore,
    min_content_len: usize,
    throttle: Duration,
) -> (DocOutcome, DocStats) {
    let mut stats = DocStats::default();

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => return (DocOutcome::Failed(format!("unreadable: {}", e)), stats),
    };

    if content.chars().count() < min_content_len {
        return (DocOutcome::SkippedTooShort, stats);
    }

    let spans = match extractor.extract(&content).await {
        Ok(spans) => spans,
        Err(e) => {
            warn!(
                document = %path.display(),
                error = %e,
                "Extraction service failed, continuing with zero entities"
            );
            stats.detail = Some(format!(
                "extraction service error, treated as zero entities: {}",
                e
            ));
            Vec::new()
        }
    };

    if !throttle.is_zero() {
        tokio::time::sleep(throttle).await;
    }

    stats.entities_extracted = spans.len();

    let mut entities = Vec::with_capacity(spans.len());
    for span in &spans {
        match engine.enrich(span) {
            Some(entity) => entities.push(entity),
            None => stats.entities_dropped += 1,
        }
    }

    for entity in &entities {
        let key = NodeKey::from(entity);
        let attrs = NodeAttrs::from(entity);
        if let Err(e) = store.upsert_node(&key, &attrs).await {
            return (
                DocOutcome::Failed(format!("node upsert failed: {:#}", e)),
                stats,
            );
        }
    }

    let candidates = enrich::extract_candidates(&entities);
    stats.edges_emitted = candidates.len();

    for candidate in &candidates {
        let source = NodeKey::from(candidate.source);
        let target = NodeKey::from(candidate.target);
        let attrs = EdgeAttrs {
            confidence: candidate.confidence,
        };

        match store
            .upsert_relationship(&source, candidate.relation_type, &target, &attrs)
            .await
        {
            Ok(true) => stats.edges_written += 1,
            Ok(false) => stats.edges_skipped += 1,
            Err(e) => {
                return (
                    DocOutcome::Failed(format!("edge upsert failed: {:#}", e)),
                    stats,
                );
            }
        }
    }

    (DocOutcome::Processed, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use async_trait::async_trait;
    use extract::RawSpan;
    use graph::MemoryStore;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct MockExtractor {
        spans: Vec<RawSpan>,
        calls: AtomicUsize,
    }

    impl MockExtractor {
        fn new(spans: Vec<RawSpan>) -> Arc<Self> {
            Arc::new(Self {
                spans,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExtractionService for MockExtractor {
        async fn extract(&self, _text: &str) -> Result<Vec<RawSpan>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.spans.clone())
        }
    }

    struct DownExtractor;

    #[async_trait]
    impl ExtractionService for DownExtractor {
        async fn extract(&self, _text: &str) -> Result<Vec<RawSpan>> {
            anyhow::bail!("connection refused")
        }
    }

    fn scenario_spans() -> Vec<RawSpan> {
        vec![
            RawSpan::new("APT29", "THREAT_ACTOR", 0, 5),
            RawSpan::new("Cobalt Strike", "MALWARE", 50, 63),
        ]
    }

    fn write_doc(root: &Path, name: &str) -> PathBuf {
        let path = root.join(name);
        let content = "APT29 deployed Cobalt Strike beacons against several European \
                       ministries during the spring intrusion wave, rotating staging \
                       infrastructure weekly to evade detection."
            .to_string();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn test_config(dir: &TempDir, skip_processed: bool) -> PipelineConfig {
        PipelineConfig {
            workers: 2,
            throttle_ms: 0,
            ledger_flush_every: 2,
            skip_processed,
            ledger_path: dir.path().join("state/ledger.json"),
            audit_log_path: dir.path().join("state/audit.jsonl"),
            ..PipelineConfig::default()
        }
    }

    fn orchestrator(
        extractor: Arc<dyn ExtractionService>,
        store: Arc<MemoryStore>,
        config: PipelineConfig,
    ) -> Orchestrator {
        Orchestrator::new(
            extractor,
            store,
            EnrichmentEngine::with_builtin_taxonomy(),
            config,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_two_nodes_one_edge() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");

        let store = Arc::new(MemoryStore::new());
        let summary = orchestrator(
            MockExtractor::new(scenario_spans()),
            store.clone(),
            test_config(&dir, false),
        )
        .run(&corpus)
        .await
        .unwrap();

        assert_eq!(summary.documents_processed, 1);
        assert_eq!(summary.entities_extracted, 2);
        assert_eq!(summary.entities_dropped, 0);
        assert_eq!(summary.edges_written, 1);
        assert_eq!(summary.nodes_added, 2);
        assert_ne!(summary.status, RunStatus::Critical);

        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");

        let store = Arc::new(MemoryStore::new());

        // skip_processed off: the document is fully reprocessed and the
        // upsert layer alone must keep the graph unchanged.
        for _ in 0..2 {
            orchestrator(
                MockExtractor::new(scenario_spans()),
                store.clone(),
                test_config(&dir, false),
            )
            .run(&corpus)
            .await
            .unwrap();
        }

        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_second_run_nodes_added_is_zero() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");

        let store = Arc::new(MemoryStore::new());

        let first = orchestrator(
            MockExtractor::new(scenario_spans()),
            store.clone(),
            test_config(&dir, false),
        )
        .run(&corpus)
        .await
        .unwrap();
        let second = orchestrator(
            MockExtractor::new(scenario_spans()),
            store.clone(),
            test_config(&dir, false),
        )
        .run(&corpus)
        .await
        .unwrap();

        assert_eq!(first.nodes_added, 2);
        assert_eq!(second.nodes_added, 0);
        assert!(second.validation.node_preservation);
    }

    #[tokio::test]
    async fn test_resume_never_reextracts_processed_documents() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");

        let store = Arc::new(MemoryStore::new());
        let extractor = MockExtractor::new(scenario_spans());

        let first = orchestrator(
            extractor.clone(),
            store.clone(),
            test_config(&dir, true),
        )
        .run(&corpus)
        .await
        .unwrap();
        assert_eq!(first.documents_processed, 1);
        assert_eq!(extractor.calls(), 1);

        let second = orchestrator(
            extractor.clone(),
            store.clone(),
            test_config(&dir, true),
        )
        .run(&corpus)
        .await
        .unwrap();

        assert_eq!(extractor.calls(), 1);
        assert_eq!(second.documents_already_processed, 1);
        assert_eq!(second.documents_processed, 0);
    }

    #[tokio::test]
    async fn test_unmapped_label_is_counted_but_creates_no_node() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");

        let store = Arc::new(MemoryStore::new());
        let spans = vec![RawSpan::new("oil on canvas", "PAINTING", 0, 13)];
        let summary = orchestrator(
            MockExtractor::new(spans),
            store.clone(),
            test_config(&dir, false),
        )
        .run(&corpus)
        .await
        .unwrap();

        assert_eq!(summary.entities_extracted, 1);
        assert_eq!(summary.entities_dropped, 1);
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn test_short_document_is_skipped_without_extraction() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        std::fs::write(corpus.join("stub.md"), "tiny").unwrap();

        let store = Arc::new(MemoryStore::new());
        let extractor = MockExtractor::new(scenario_spans());
        let summary = orchestrator(extractor.clone(), store, test_config(&dir, false))
            .run(&corpus)
            .await
            .unwrap();

        assert_eq!(summary.documents_skipped, 1);
        assert_eq!(summary.documents_processed, 0);
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_document_fails_without_aborting_run() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "good.md");
        std::fs::write(corpus.join("broken.md"), [0xC3u8, 0x28].repeat(80)).unwrap();

        let store = Arc::new(MemoryStore::new());
        let summary = orchestrator(
            MockExtractor::new(scenario_spans()),
            store,
            test_config(&dir, false),
        )
        .run(&corpus)
        .await
        .unwrap();

        assert_eq!(summary.documents_failed, 1);
        assert_eq!(summary.documents_processed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].error.contains("unreadable"));
    }

    #[tokio::test]
    async fn test_extraction_outage_recovers_as_zero_entities() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");

        let store = Arc::new(MemoryStore::new());
        let summary = orchestrator(Arc::new(DownExtractor), store.clone(), test_config(&dir, false))
            .run(&corpus)
            .await
            .unwrap();

        assert_eq!(summary.documents_processed, 1);
        assert_eq!(summary.documents_failed, 0);
        assert_eq!(summary.entities_extracted, 0);
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn test_audit_log_gets_one_line_per_attempted_document() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("corpus");
        std::fs::create_dir_all(&corpus).unwrap();
        write_doc(&corpus, "intel.md");
        std::fs::write(corpus.join("stub.md"), "tiny").unwrap();

        let config = test_config(&dir, false);
        let audit_path = config.audit_log_path.clone();
        let store = Arc::new(MemoryStore::new());
        orchestrator(MockExtractor::new(scenario_spans()), store, config)
            .run(&corpus)
            .await
            .unwrap();

        let content = std::fs::read_to_string(&audit_path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
