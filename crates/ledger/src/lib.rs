pub mod audit;
pub mod doc_id;
pub mod state;

pub use audit::{AuditLog, AuditRecord, DocumentStatus};
pub use doc_id::document_id;
pub use state::Ledger;
