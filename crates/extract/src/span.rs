use serde::{Deserialize, Serialize};

/// One extracted mention, as returned by the NER service.
/// Offsets are character positions into the document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpan {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl RawSpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            start,
            end,
        }
    }
}
