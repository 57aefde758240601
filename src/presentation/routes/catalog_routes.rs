use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use crate::app::AppState;
use crate::application::dto::catalog_dto::CatalogPageDto;
use crate::presentation::errors::ApiError;
use crate::presentation::routes::helpers::{log_request, map_api_error};

pub async fn browse_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<CatalogPageDto>, ApiError> {
    log_request("GET /catalog/themes");

    state
        .catalog_service
        .browse(&query)
        .await
        .map(Json)
        .map_err(map_api_error("Failed to browse theme catalog"))
}
