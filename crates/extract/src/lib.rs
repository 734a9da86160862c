pub mod client;
pub mod retry;
pub mod span;

pub use client::{ExtractionService, HttpExtractionClient};
pub use retry::RetryPolicy;
pub use span::RawSpan;
