//! Configuration reload handler.

use crate::{
    types::{AppError, ReloadConfigResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Re-read the configuration file.
///
/// `[rag]` settings and the generation timeout apply to the next request.
/// Changed sections that need a restart are listed in the response.
#[utoipa::path(
    post,
    path = "/config/reload",
    responses(
        (status = 200, description = "Configuration reloaded", body = ReloadConfigResponse),
        (status = 500, description = "File missing or invalid; previous configuration kept", body = crate::types::ErrorResponse)
    ),
    tag = "config"
)]
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadConfigResponse>> {
    let manager = &state.config_manager;

    let restart_required = manager.reload().map_err(|e| {
        tracing::error!(
            path = %manager.path().display(),
            error = %e,
            "Configuration reload failed"
        );
        AppError::from(e)
    })?;

    let config = manager.config();
    Ok(Json(ReloadConfigResponse {
        chunk_size: config.rag.chunk_size,
        top_k: config.rag.top_k,
        max_top_k: config.rag.max_top_k,
        restart_required: restart_required.into_iter().map(str::to_string).collect(),
    }))
}
