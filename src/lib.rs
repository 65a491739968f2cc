//! # pyq-analyser
//!
//! A minimal Retrieval-Augmented Generation server: upload question papers and
//! notes, then ask questions answered from their content.
//!
//! ## Overview
//!
//! pyq-analyser can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `pyq-server` binary
//! 2. **As a library** - Build the pipelines into your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use pyq::{AppState, PyqConfigManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Arc::new(PyqConfigManager::new("pyq.toml")?);
//!     let state = AppState::from_config(manager)?;
//!
//!     let bytes = std::fs::read("notes.txt")?;
//!     state.ingestion.ingest(&bytes, "notes.txt").await?;
//!
//!     let answer = state.query.ask("What is a deadlock?", None).await?;
//!     println!("{}", answer.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama embeddings and generation (default) |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line interface
//! - [`llm`] - Provider clients
//! - [`rag`] - Chunking, extraction, ingestion and query pipelines
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration
//!
//! ## Architecture
//!
//! One [`ChunkIndex`] is created at startup and handed to both pipelines. It
//! lives for the process lifetime and is never persisted; restarting the
//! server empties it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use rag::embeddings::{EmbeddingProvider, EmbeddingService};
pub use rag::extract::{Extractor, ExtractorRegistry};
pub use rag::ingest::{ChunkIndex, IngestReport, IngestionPipeline};
pub use rag::query::{Answer, QueryPipeline};
pub use types::{AppError, Result};
pub use utils::toml_config::{PyqConfig, PyqConfigManager};

use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration; `POST /config/reload` swaps it in place
    pub config_manager: Arc<PyqConfigManager>,
    /// The process-wide chunk index shared by both pipelines
    pub index: Arc<ChunkIndex>,
    /// Upload ingestion
    pub ingestion: Arc<IngestionPipeline>,
    /// Question answering
    pub query: Arc<QueryPipeline>,
}

impl AppState {
    /// Build the state from configuration, creating provider clients and
    /// an empty index.
    pub fn from_config(config_manager: Arc<PyqConfigManager>) -> Result<Self> {
        let config = config_manager.config();

        let embedder = Provider::for_embedding(&config)?.create_embedder()?;
        let generator = Provider::for_generation(&config)?.create_client()?;
        let extractor = Arc::new(ExtractorRegistry::from_config(&config.extraction)?);

        Self::with_components(config_manager, embedder, generator, extractor)
    }

    /// Build the state around caller-supplied providers and extractor.
    pub fn with_components(
        config_manager: Arc<PyqConfigManager>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn LLMClient>,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self> {
        let config = config_manager.config();

        let index = Arc::new(ChunkIndex::new(config.embedding.dimensions)?);
        let embeddings = EmbeddingService::new(
            embedder,
            config.embedding.dimensions,
            Duration::from_secs(config.embedding.timeout_secs),
        );

        let ingestion = IngestionPipeline::new(
            Arc::clone(&index),
            embeddings.clone(),
            extractor,
            Arc::clone(&config_manager),
        );
        let query = QueryPipeline::new(
            Arc::clone(&index),
            embeddings,
            generator,
            Arc::clone(&config_manager),
        );

        tracing::info!(
            embedding_model = %config.embedding.model,
            generation_model = %config.generation.model,
            dimensions = config.embedding.dimensions,
            "Pipelines ready"
        );

        Ok(Self {
            config_manager,
            index,
            ingestion: Arc::new(ingestion),
            query: Arc::new(query),
        })
    }
}
