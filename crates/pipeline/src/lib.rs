pub mod config;
pub mod discover;
pub mod orchestrator;
pub mod summary;
pub mod validate;

pub use config::{CorpusConfig, PipelineConfig};
pub use discover::discover_documents;
pub use orchestrator::Orchestrator;
pub use summary::{FailureDetail, RunStatus, RunSummary};
pub use validate::{ValidationReport, ValidationSnapshot};
