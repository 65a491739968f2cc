//! Embedding gateway
//!
//! [`EmbeddingService`] wraps whichever [`EmbeddingProvider`] is configured and
//! enforces the contract the index relies on: one vector per input, every vector
//! of the configured dimensionality, and a bounded wait on each provider call.
//! It never retries.

use crate::types::{AppError, ProviderFailure, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Task hint passed to providers that distinguish document and query embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            TaskType::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

/// External embedding capability.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, returning vectors in input order.
    async fn embed(&self, texts: &[String], task: TaskType) -> Result<Vec<Vec<f32>>>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
    timeout: Duration,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimensions: usize, timeout: Duration) -> Self {
        Self {
            provider,
            dimensions,
            timeout,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed a single text.
    ///
    /// Questions go through here as well and keep the document task type.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_texts(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            AppError::provider(
                ProviderFailure::InvalidResponse,
                "provider returned no embedding",
            )
        })
    }

    /// Embed a batch of texts.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let call = self.provider.embed(texts, TaskType::RetrievalDocument);
        let vectors = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                AppError::provider(
                    ProviderFailure::Timeout,
                    format!(
                        "embedding call to {} exceeded {:?}",
                        self.provider.model_name(),
                        self.timeout
                    ),
                )
            })??;

        if vectors.len() != texts.len() {
            return Err(AppError::provider(
                ProviderFailure::InvalidResponse,
                format!(
                    "requested {} embeddings, provider returned {}",
                    texts.len(),
                    vectors.len()
                ),
            ));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(AppError::provider(
                ProviderFailure::DimensionMismatch,
                format!(
                    "expected {}-dimensional embeddings, got {}",
                    self.dimensions,
                    bad.len()
                ),
            ));
        }

        Ok(vectors)
    }
}
