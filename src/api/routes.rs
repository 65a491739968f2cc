use crate::api::handlers::{config, health, index, rag};
use crate::api::ApiDoc;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Routes without state or middleware attached.
pub fn create_router() -> Router<AppState> {
    let router = Router::new()
        .route("/upload", post(rag::upload))
        .route("/ask", post(rag::ask))
        .route("/index", get(index::stats).delete(index::clear))
        .route("/config/reload", post(config::reload))
        .route("/health", get(health::health));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    router
}

/// The full application: routes, upload size limit, permissive CORS and
/// request tracing.
pub fn create_app(state: AppState) -> Router {
    let max_upload_bytes = state.config_manager.config().server.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}
