//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Word-count chunking of extracted text
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding gateway over the configured provider
//! - [`rag::extract`](crate::rag::extract) - Format detection and text extraction
//! - [`rag::ingest`](crate::rag::ingest) - Upload ingestion into the shared index
//! - [`rag::query`](crate::rag::query) - Retrieve-then-generate question answering
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - Documents are extracted, chunked and embedded one chunk at a time
//! 2. **Storage** - Each vector is appended to the in-memory index next to its chunk
//! 3. **Retrieval** - The question is embedded and its nearest chunks are retrieved
//! 4. **Generation** - The model answers from the retrieved context, or from the
//!    question alone when nothing was retrieved
//!
//! # Example
//!
//! ```ignore
//! use pyq::rag::{ingest::IngestionPipeline, query::QueryPipeline};
//!
//! let report = ingestion.ingest(&bytes, "notes.pdf").await?;
//! println!("indexed {} chunks", report.chunk_count);
//!
//! let answer = query.ask("What is covered in unit 3?", None).await?;
//! println!("{}", answer.answer);
//! ```

pub mod chunker;
pub mod embeddings;
pub mod extract;
pub mod ingest;
pub mod query;
