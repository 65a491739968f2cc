//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for pyq-analyser, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## RAG
//! - `POST /upload` - Upload one document (multipart field `file`) and index it
//! - `POST /ask` - Answer `{"question": "...", "k": 4}` from the indexed content
//!
//! ## Index
//! - `GET /index` - Chunk, dimension and source counts
//! - `DELETE /index` - Drop all indexed content
//!
//! ## Config
//! - `POST /config/reload` - Re-read the configuration file
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`.

/// Extractors with JSON error bodies.
pub mod extract;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

/// OpenAPI description of every route.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::rag::upload,
        handlers::rag::ask,
        handlers::index::stats,
        handlers::index::clear,
        handlers::config::reload,
        handlers::health::health,
    ),
    components(schemas(
        crate::types::AskRequest,
        crate::types::AskResponse,
        crate::types::UploadForm,
        crate::types::UploadResponse,
        crate::types::UploadedFile,
        crate::types::IndexStatsResponse,
        crate::types::ClearIndexResponse,
        crate::types::ReloadConfigResponse,
        crate::types::HealthResponse,
        crate::types::ErrorResponse,
    )),
    tags(
        (name = "rag", description = "Document upload and question answering"),
        (name = "index", description = "Index inspection"),
        (name = "config", description = "Configuration reload"),
        (name = "health", description = "Service health")
    ),
    info(title = "pyq-analyser", description = "Question answering over uploaded documents")
)]
pub struct ApiDoc;

pub use routes::create_app;
