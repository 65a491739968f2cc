//! Query pipeline: embed the question, retrieve, assemble a prompt, generate.

use crate::llm::LLMClient;
use crate::rag::embeddings::EmbeddingService;
use crate::rag::ingest::ChunkIndex;
use crate::types::{AppError, Chunk, Result, INTERNAL_ERROR_MESSAGE};
use crate::utils::toml_config::PyqConfigManager;
use pyq_vector::SearchHit;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

/// Separator placed between retrieved chunks in a context prompt.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

const CONTEXT_INSTRUCTIONS: &str = "Use the following context to answer the question. \
If the answer is not contained in the context, answer based on your general knowledge.";

/// Build the prompt sent to the generative model.
///
/// With no retrieved chunks the prompt carries only the question.
pub fn build_prompt(question: &str, context: &[&str]) -> String {
    if context.is_empty() {
        return format!("Answer the following question:\n\nQuestion: {}", question);
    }

    format!(
        "{}\n\n{}\n\nQuestion: {}",
        CONTEXT_INSTRUCTIONS,
        context.join(CONTEXT_DELIMITER),
        question
    )
}

/// Stage a query was in when it finished or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    EmptyQuestion,
    Embedding,
    Retrieving,
    Prompting,
    Generating,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryStage::EmptyQuestion => "empty_question",
            QueryStage::Embedding => "embedding",
            QueryStage::Retrieving => "retrieving",
            QueryStage::Prompting => "prompting",
            QueryStage::Generating => "generating",
        };
        f.write_str(name)
    }
}

/// A generated answer plus the context it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    pub context: Vec<SearchHit<Chunk>>,
}

impl Answer {
    pub fn used_context(&self) -> bool {
        !self.context.is_empty()
    }
}

#[derive(Clone)]
pub struct QueryPipeline {
    index: Arc<ChunkIndex>,
    embeddings: EmbeddingService,
    generator: Arc<dyn LLMClient>,
    config: Arc<PyqConfigManager>,
}

impl QueryPipeline {
    pub fn new(
        index: Arc<ChunkIndex>,
        embeddings: EmbeddingService,
        generator: Arc<dyn LLMClient>,
        config: Arc<PyqConfigManager>,
    ) -> Self {
        Self {
            index,
            embeddings,
            generator,
            config,
        }
    }

    /// Answer a question using up to `k` retrieved chunks (default when `None`).
    ///
    /// `rag.top_k`, `rag.max_top_k` and `generation.timeout_secs` are read from
    /// the current configuration on every call.
    ///
    /// Embedding failures are returned as provider errors. Generation failures
    /// are logged and replaced by a generic internal error.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str, k: Option<usize>) -> Result<Answer> {
        let start = Instant::now();

        let question = question.trim();
        if question.is_empty() {
            debug!(stage = %QueryStage::EmptyQuestion, "Rejected blank question");
            return Err(AppError::InvalidInput("Question is required".to_string()));
        }

        let config = self.config.config();
        let max_k = config.rag.max_top_k;
        let k = k.unwrap_or(config.rag.top_k);
        if k == 0 || k > max_k {
            return Err(AppError::InvalidInput(format!(
                "k must be between 1 and {}",
                max_k
            )));
        }

        let query_vector = self.embeddings.embed_text(question).await.map_err(|e| {
            error!(stage = %QueryStage::Embedding, error = %e, "Question embedding failed");
            e
        })?;

        let hits = self.index.search(&query_vector, k).map_err(|e| {
            error!(stage = %QueryStage::Retrieving, error = %e, "Index search failed");
            AppError::from(e)
        })?;

        let context: Vec<&str> = hits.iter().map(|hit| hit.payload.text.as_str()).collect();
        let prompt = build_prompt(question, &context);
        debug!(stage = %QueryStage::Prompting, context = context.len(), "Prompt assembled");

        let timeout = Duration::from_secs(config.generation.timeout_secs);
        let answer = self.generate(&prompt, timeout).await?;

        info!(
            k,
            retrieved = hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Question answered"
        );

        Ok(Answer {
            answer,
            context: hits,
        })
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let outcome = tokio::time::timeout(timeout, self.generator.generate(prompt)).await;

        match outcome {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(e)) => {
                error!(
                    stage = %QueryStage::Generating,
                    model = self.generator.model_name(),
                    error = %e,
                    "Generation failed"
                );
                Err(AppError::Internal(INTERNAL_ERROR_MESSAGE.to_string()))
            }
            Err(_) => {
                error!(
                    stage = %QueryStage::Generating,
                    model = self.generator.model_name(),
                    timeout = ?timeout,
                    "Generation timed out"
                );
                Err(AppError::Internal(INTERNAL_ERROR_MESSAGE.to_string()))
            }
        }
    }
}
