//! Ingestion pipeline: extract, chunk, embed, append.

use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::EmbeddingService;
use crate::rag::extract::{DocumentFormat, Extractor};
use crate::types::{AppError, Chunk, Result};
use crate::utils::toml_config::PyqConfigManager;
use pyq_vector::VectorIndex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// The shared index pairing embedding vectors with their chunks.
pub type ChunkIndex = VectorIndex<Chunk>;

/// Outcome of a fully successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source_id: String,
    pub filename: String,
    pub chunk_count: usize,
}

#[derive(Clone)]
pub struct IngestionPipeline {
    index: Arc<ChunkIndex>,
    embeddings: EmbeddingService,
    extractor: Arc<dyn Extractor>,
    config: Arc<PyqConfigManager>,
}

impl IngestionPipeline {
    pub fn new(
        index: Arc<ChunkIndex>,
        embeddings: EmbeddingService,
        extractor: Arc<dyn Extractor>,
        config: Arc<PyqConfigManager>,
    ) -> Self {
        Self {
            index,
            embeddings,
            extractor,
            config,
        }
    }

    pub fn index(&self) -> &Arc<ChunkIndex> {
        &self.index
    }

    /// Ingest one uploaded file.
    ///
    /// Format and extraction failures leave the index untouched. Chunks are
    /// embedded one at a time and appended as soon as their vector arrives, so
    /// a provider failure on chunk `i` leaves chunks `0..i` indexed and returns
    /// [`AppError::PartialIngestion`].
    ///
    /// The chunk size is read from the current configuration on every call.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(&self, bytes: &[u8], filename: &str) -> Result<IngestReport> {
        let start = Instant::now();

        let format = DocumentFormat::from_filename(filename)?;
        let text = self.extractor.extract(bytes, format).await?;
        let chunker = TextChunker::new(self.config.config().rag.chunk_size);
        let chunks = chunker.chunk(&text);
        let source_id = uuid::Uuid::new_v4().to_string();

        if chunks.is_empty() {
            info!(filename, "Document produced no chunks");
            return Ok(IngestReport {
                source_id,
                filename: filename.to_string(),
                chunk_count: 0,
            });
        }

        let total = chunks.len();
        for (ordinal, text) in chunks.into_iter().enumerate() {
            if let Err(err) = self.index_chunk(&source_id, ordinal, text).await {
                warn!(
                    filename,
                    indexed = ordinal,
                    total,
                    error = %err,
                    "Ingestion stopped part-way"
                );
                return Err(AppError::PartialIngestion {
                    indexed: ordinal,
                    total,
                    source: Box::new(err),
                });
            }
        }

        info!(
            filename,
            %format,
            chunks = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document ingested"
        );

        Ok(IngestReport {
            source_id,
            filename: filename.to_string(),
            chunk_count: total,
        })
    }

    async fn index_chunk(&self, source_id: &str, ordinal: usize, text: String) -> Result<()> {
        let vector = self.embeddings.embed_text(&text).await?;
        let chunk = Chunk {
            text,
            ordinal,
            source_id: source_id.to_string(),
        };
        let indexed = self.index.append(vec![vector], vec![chunk])?;
        debug!(ordinal, indexed, "Chunk indexed");
        Ok(())
    }
}
