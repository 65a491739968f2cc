//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the embedding and generation
//! providers. Provider-specific implementations sit behind [`LLMClient`] and
//! [`EmbeddingProvider`](crate::rag::embeddings::EmbeddingProvider), so the
//! pipelines work with any supported backend.
//!
//! # Supported Providers
//!
//! - `gemini` - Google Gemini REST API (always available)
//! - `ollama` - Local Ollama server (`ollama` feature, on by default)
//!
//! # Example
//!
//! ```ignore
//! use pyq::llm::Provider;
//!
//! let provider = Provider::for_generation(&config)?;
//! let client = provider.create_client()?;
//!
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Gemini REST client.
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};
