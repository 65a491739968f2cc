//! Mock implementations for testing.
//!
//! This module provides mock providers and a ready-made [`AppState`] that can be
//! used across different test files without duplication.

use async_trait::async_trait;
use pyq::rag::embeddings::{EmbeddingProvider, TaskType};
use pyq::rag::extract::ExtractorRegistry;
use pyq::types::{AppError, ProviderFailure, Result};
use pyq::{AppState, LLMClient, PyqConfig, PyqConfigManager};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Dimensionality used by every test configuration.
pub const TEST_DIMENSIONS: usize = 16;

/// Mock LLM client that records every prompt it receives.
///
/// # Examples
///
/// ```ignore
/// // Always answers "Hello"
/// let client = MockLLMClient::new("Hello");
///
/// // Answers with the prompt it was given
/// let client = MockLLMClient::echo();
///
/// // Always fails
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone, Default)]
pub struct MockLLMClient {
    response: Option<String>,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Self::default()
        }
    }

    /// Create a mock client that answers with the prompt itself.
    pub fn echo() -> Self {
        Self::default()
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::provider(
                ProviderFailure::Auth,
                "Mock LLM failure: API key sk-secret rejected",
            ));
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| prompt.to_string()))
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

/// Deterministic bag-of-words embedder.
///
/// Each word increments one bucket chosen from its bytes, so texts sharing
/// words land close together. Can be told to fail on the Nth call (1-based)
/// or to return vectors of the wrong width.
#[derive(Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    fail_on_call: Option<usize>,
    calls: Arc<AtomicUsize>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            dimensions: TEST_DIMENSIONS,
            fail_on_call: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the `n`th call with a rate-limit error.
    pub fn failing_on_call(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::new()
        }
    }

    /// Return vectors with `dimensions` components regardless of configuration.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector this embedder produces for `text`.
    pub fn vector_for(text: &str) -> Vec<f32> {
        bag_of_words(text, TEST_DIMENSIONS)
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn bag_of_words(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0; dimensions];
    for word in text.split_whitespace() {
        let bucket = word
            .to_lowercase()
            .bytes()
            .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % dimensions;
        vector[bucket] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, texts: &[String], _task: TaskType) -> Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        // Suspend like a real network call so concurrent ingests interleave.
        tokio::task::yield_now().await;
        if Some(call) == self.fail_on_call {
            return Err(AppError::provider(
                ProviderFailure::RateLimit,
                "Mock embedding quota exhausted",
            ));
        }
        Ok(texts
            .iter()
            .map(|text| bag_of_words(text, self.dimensions))
            .collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}

/// TOML text of the integration-test configuration.
pub fn test_config_toml(chunk_size: usize) -> String {
    format!(
        r#"
[providers.local]
type = "ollama"

[embedding]
provider = "local"
model = "mock-embedder"
dimensions = {}
timeout_secs = 5

[generation]
provider = "local"
model = "mock-llm"
timeout_secs = 5

[rag]
chunk_size = {}
top_k = 4
max_top_k = 10
"#,
        TEST_DIMENSIONS, chunk_size
    )
}

/// Configuration used by integration tests: tiny chunks, small vectors.
pub fn test_config(chunk_size: usize) -> PyqConfig {
    PyqConfig::parse(&test_config_toml(chunk_size)).expect("test config should parse")
}

/// Build an [`AppState`] around the given mocks with plain-text extraction.
pub fn test_state(chunk_size: usize, embedder: MockEmbedder, llm: MockLLMClient) -> AppState {
    let manager = Arc::new(PyqConfigManager::from_config(test_config(chunk_size)));
    state_with_manager(manager, embedder, llm)
}

/// Build an [`AppState`] whose configuration is loaded from `path`.
pub fn test_state_from_file(path: &Path, embedder: MockEmbedder, llm: MockLLMClient) -> AppState {
    let manager = Arc::new(PyqConfigManager::new(path).expect("test config file should load"));
    state_with_manager(manager, embedder, llm)
}

fn state_with_manager(
    manager: Arc<PyqConfigManager>,
    embedder: MockEmbedder,
    llm: MockLLMClient,
) -> AppState {
    AppState::with_components(
        manager,
        Arc::new(embedder),
        Arc::new(llm),
        Arc::new(ExtractorRegistry::plain_text_only()),
    )
    .expect("test state should build")
}
