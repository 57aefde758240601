use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub mod catalog_routes;
pub mod helpers;
pub mod theme_routes;

#[cfg(test)]
mod tests;

/// Room for multipart boundaries and headers on top of the archive itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .server
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/themes", get(theme_routes::list_themes))
        .route(
            "/themes/:name",
            post(theme_routes::theme_action).delete(theme_routes::remove_theme),
        )
        .route(
            "/themes/:name/:item",
            get(theme_routes::theme_item).post(theme_routes::theme_item_action),
        )
        .route("/catalog/themes", get(catalog_routes::browse_catalog))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
