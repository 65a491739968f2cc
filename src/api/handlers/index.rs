//! Index inspection and reset handlers.

use crate::{
    types::{ClearIndexResponse, IndexStatsResponse, Result},
    AppState,
};
use axum::{extract::State, Json};
use std::collections::HashSet;

/// Report how much content is currently indexed.
#[utoipa::path(
    get,
    path = "/index",
    responses(
        (status = 200, description = "Index statistics", body = IndexStatsResponse)
    ),
    tag = "index"
)]
pub async fn stats(State(state): State<AppState>) -> Result<Json<IndexStatsResponse>> {
    let stats = state.index.stats();
    let sources = state.index.with_payloads(|chunks| {
        chunks
            .iter()
            .map(|chunk| chunk.source_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    });

    Ok(Json(IndexStatsResponse {
        chunks: stats.count,
        dimensions: stats.dimensions,
        sources,
    }))
}

/// Drop every indexed chunk.
#[utoipa::path(
    delete,
    path = "/index",
    responses(
        (status = 200, description = "Index cleared", body = ClearIndexResponse)
    ),
    tag = "index"
)]
pub async fn clear(State(state): State<AppState>) -> Result<Json<ClearIndexResponse>> {
    let chunks_removed = state.index.clear();
    tracing::warn!(chunks_removed, "Index cleared");

    Ok(Json(ClearIndexResponse { chunks_removed }))
}
