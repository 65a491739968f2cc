use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Message returned to callers for any failure whose detail must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error occurred";

// ============= RAG Types =============

/// One retrievable slice of a document's extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Chunk {
    /// Space-joined words of this segment.
    pub text: String,
    /// 0-based position within the source document.
    pub ordinal: usize,
    /// Opaque handle of the upload this chunk came from.
    pub source_id: String,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    /// Natural-language question. Missing and blank are both rejected.
    #[serde(default)]
    pub question: String,
    /// Number of chunks to retrieve as context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
}

/// Multipart body accepted by `POST /upload`.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The document to index. Its extension selects the extractor.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub status: String,
    pub num_chunks: usize,
    pub file: UploadedFile,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    pub name: String,
    pub chunks: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexStatsResponse {
    pub chunks: usize,
    pub dimensions: usize,
    pub sources: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearIndexResponse {
    pub chunks_removed: usize,
}

/// Retrieval settings in force after a reload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReloadConfigResponse {
    pub chunk_size: usize,
    pub top_k: usize,
    pub max_top_k: usize,
    /// Changed sections that apply only after a restart.
    pub restart_required: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ============= Error Types =============

/// What went wrong when talking to an embedding or generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    Auth,
    RateLimit,
    Timeout,
    Network,
    DimensionMismatch,
    InvalidResponse,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderFailure::Auth => "auth",
            ProviderFailure::RateLimit => "rate limit",
            ProviderFailure::Timeout => "timeout",
            ProviderFailure::Network => "network",
            ProviderFailure::DimensionMismatch => "dimension mismatch",
            ProviderFailure::InvalidResponse => "invalid response",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Provider error ({kind}): {message}")]
    Provider {
        kind: ProviderFailure,
        message: String,
    },

    #[error("Arity mismatch: {vectors} vectors for {chunks} chunks")]
    ArityMismatch { vectors: usize, chunks: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ingestion stopped part-way; the first `indexed` chunks remain searchable.
    #[error("Ingestion stopped after {indexed} of {total} chunks: {source}")]
    PartialIngestion {
        indexed: usize,
        total: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn provider(kind: ProviderFailure, message: impl Into<String>) -> Self {
        AppError::Provider {
            kind,
            message: message.into(),
        }
    }

    /// Returns the provider failure kind, looking through partial ingestion.
    pub fn provider_failure(&self) -> Option<ProviderFailure> {
        match self {
            AppError::Provider { kind, .. } => Some(*kind),
            AppError::PartialIngestion { source, .. } => source.provider_failure(),
            _ => None,
        }
    }
}

impl From<pyq_vector::Error> for AppError {
    fn from(err: pyq_vector::Error) -> Self {
        match err {
            pyq_vector::Error::DimensionMismatch { .. } => {
                AppError::provider(ProviderFailure::DimensionMismatch, err.to_string())
            }
            pyq_vector::Error::ArityMismatch { vectors, payloads } => AppError::ArityMismatch {
                vectors,
                chunks: payloads,
            },
            pyq_vector::Error::InvalidVector(msg) => {
                AppError::provider(ProviderFailure::InvalidResponse, msg)
            }
            pyq_vector::Error::Configuration(msg) => AppError::Configuration(msg),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<axum::extract::multipart::MultipartRejection> for AppError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        AppError::InvalidInput(format!("Invalid upload: {}", rejection.body_text()))
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, body) = match self {
            AppError::UnsupportedFormat(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                serde_json::json!({ "error": self.to_string() }),
            ),
            AppError::Extraction(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "error": self.to_string() }),
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            AppError::PartialIngestion {
                indexed,
                total,
                ref source,
            } => {
                tracing::error!(indexed, total, error = %source, "Ingestion interrupted");
                (
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "error": format!(
                            "Ingestion stopped after {} of {} chunks",
                            indexed, total
                        ),
                        "chunks_indexed": indexed,
                        "chunks_total": total,
                    }),
                )
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
