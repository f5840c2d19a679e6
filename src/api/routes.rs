use axum::{
    Router,
    extract::State,
    response::Response,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::AppState;
use crate::api::response;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/rss", get(rss_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn rss_handler(State(state): State<AppState>) -> Response {
    // Render outside the lock; the snapshot holds its own reference.
    let feed = state.feed.snapshot().feed;
    debug!(entries = feed.entries.len(), "Serving feed");
    response::rss(feed.to_rss())
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match state.feed.snapshot().error {
        None => response::healthy(),
        Some(error) => response::unhealthy(error),
    }
}
