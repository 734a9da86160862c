use anyhow::{Context, Result};
use enrich::EnrichmentEngine;
use extract::HttpExtractionClient;
use graph::Neo4jStore;
use pipeline::{Orchestrator, PipelineConfig, RunStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

async fn run() -> Result<RunStatus> {
    let corpus_root = PathBuf::from(env_or("CORPUS_ROOT", "corpus"));

    let extractor = HttpExtractionClient::new(
        env_or("EXTRACTOR_URL", "http://localhost:8000"),
        Duration::from_secs(30),
    )
    .context("Failed to build extraction client")?;

    let store = Neo4jStore::connect(
        &env_or("NEO4J_URI", "bolt://localhost:7687"),
        &env_or("NEO4J_USER", "neo4j"),
        &env_or("NEO4J_PASSWORD", "neo4j"),
    )
    .await?;
    store.init_schema().await?;

    let orchestrator = Orchestrator::new(
        Arc::new(extractor),
        Arc::new(store),
        EnrichmentEngine::with_builtin_taxonomy(),
        PipelineConfig::default(),
    );

    let summary = orchestrator.run(&corpus_root).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(summary.status)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(RunStatus::Critical) => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Pipeline run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
