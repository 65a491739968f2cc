//! RAG (Retrieval Augmented Generation) API handlers.
//!
//! Provides endpoints for:
//! - Single-file upload with synchronous ingestion
//! - Question answering over the uploaded content

use crate::{
    api::extract::ValidJson,
    types::{AppError, AskRequest, AskResponse, Result, UploadForm, UploadResponse, UploadedFile},
    AppState,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::time::Instant;

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

// ============================================================================
// Upload Endpoint
// ============================================================================

/// Upload one document and index its content.
///
/// Extraction, chunking and embedding all happen before the response is sent.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "Single `file` field"),
    responses(
        (status = 200, description = "Document ingested", body = UploadResponse),
        (status = 400, description = "Malformed upload or no file in request", body = crate::types::ErrorResponse),
        (status = 415, description = "Unsupported file format", body = crate::types::ErrorResponse),
        (status = 422, description = "Text extraction failed", body = crate::types::ErrorResponse),
        (status = 502, description = "Ingestion stopped part-way"),
        (status = 500, description = "Internal server error", body = crate::types::ErrorResponse)
    ),
    tag = "rag"
)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let mut multipart = multipart?;

    let (filename, bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?
            .ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("Uploaded file has no name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?;
        break (filename, bytes);
    };

    let report = state.ingestion.ingest(&bytes, &filename).await?;

    tracing::info!(
        file = %report.filename,
        source_id = %report.source_id,
        chunks = report.chunk_count,
        duration_ms = start.elapsed().as_millis() as u64,
        "Upload processed"
    );

    Ok(Json(UploadResponse {
        status: "success".to_string(),
        num_chunks: report.chunk_count,
        file: UploadedFile {
            name: report.filename,
            chunks: report.chunk_count,
        },
    }))
}

// ============================================================================
// Ask Endpoint
// ============================================================================

/// Answer a question from the indexed content.
///
/// Falls back to the question alone when nothing has been indexed.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Generated answer", body = AskResponse),
        (status = 400, description = "Malformed body, missing question or invalid k", body = crate::types::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::types::ErrorResponse)
    ),
    tag = "rag"
)]
pub async fn ask(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<AskRequest>,
) -> Result<Json<AskResponse>> {
    let answer = state.query.ask(&payload.question, payload.k).await?;

    tracing::debug!(used_context = answer.used_context(), "Answer ready");

    Ok(Json(AskResponse {
        answer: answer.answer,
    }))
}
