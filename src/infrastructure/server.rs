//! HTTP application assembly

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::infrastructure::AppState;
use crate::infrastructure::media::MEDIA_URL;

/// Builds the full application: `/api`, uploaded media, tracing and CORS
pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let mut origins = Vec::new();
    for origin in cors_allowed_origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => origins.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }

    let media = ServeDir::new(state.media.root());

    Router::new()
        .nest("/api", api::api_router(state))
        .nest_service(MEDIA_URL, media)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
