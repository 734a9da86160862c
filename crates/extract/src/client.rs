use crate::retry::RetryPolicy;
use crate::span::RawSpan;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seam to the entity-extraction service. The pipeline only ever sees this
/// trait; the HTTP client below is one implementation, tests use counting
/// mocks.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract entity mentions from one document's text.
    async fn extract(&self, text: &str) -> Result<Vec<RawSpan>>;
}

#[derive(Serialize)]
struct ExtractionRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ExtractionResponse {
    entities: Vec<RawSpan>,
}

/// HTTP client for the NER service: `POST {base_url}/extract` with `{text}`,
/// response `{entities: [{text, label, start, end}]}`.
#[derive(Clone)]
pub struct HttpExtractionClient {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpExtractionClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build extraction HTTP client")?;

        Ok(Self {
            base_url,
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn extract_once(&self, text: &str) -> Result<Vec<RawSpan>> {
        let url = format!("{}/extract", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ExtractionRequest { text })
            .send()
            .await
            .context("Failed to send request to extraction service")?;

        if !response.status().is_success() {
            anyhow::bail!("Extraction request failed: {}", response.status());
        }

        let parsed: ExtractionResponse = response
            .json()
            .await
            .context("Failed to parse extraction response")?;

        Ok(parsed.entities)
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionClient {
    async fn extract(&self, text: &str) -> Result<Vec<RawSpan>> {
        self.retry
            .retry("extract_entities", || self.extract_once(text))
            .await
    }
}
