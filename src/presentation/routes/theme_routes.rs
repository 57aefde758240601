use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;

use crate::app::AppState;
use crate::application::dto::theme_dto::{ScreenshotQueryDto, SetActiveThemeDto, ThemeListDto};
use crate::presentation::errors::ApiError;
use crate::presentation::routes::helpers::{log_request, map_api_error, success, SuccessBody};

const UPLOAD_FIELD: &str = "file";

// Action segments share the `/themes/:name` namespace with installed themes,
// which may carry the same names; only the HTTP method tells them apart.
const UPLOAD_ACTION: &str = "upload";
const ACTIVE_ACTION: &str = "active";
const DOWNLOAD_ACTION: &str = "download";
const SCREENSHOT_ITEM: &str = "screenshot";

pub async fn list_themes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ThemeListDto>, ApiError> {
    log_request("GET /themes");

    state
        .theme_service
        .list_themes()
        .await
        .map(Json)
        .map_err(map_api_error("Failed to list themes"))
}

/// `POST /themes/upload` and `POST /themes/active`
pub async fn theme_action(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
    request: Request,
) -> Result<SuccessBody, ApiError> {
    match action.as_str() {
        UPLOAD_ACTION => {
            let multipart = Multipart::from_request(request, &state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            upload_theme(&state, multipart).await
        }
        ACTIVE_ACTION => {
            let Json(dto) = Json::<SetActiveThemeDto>::from_request(request, &state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            set_active_theme(&state, dto).await
        }
        _ => Err(ApiError::NotFound(format!("Unknown theme action: {}", action))),
    }
}

/// `POST /themes/download/:identifier`
pub async fn theme_item_action(
    State(state): State<Arc<AppState>>,
    Path((action, identifier)): Path<(String, String)>,
) -> Result<SuccessBody, ApiError> {
    if action != DOWNLOAD_ACTION {
        return Err(ApiError::NotFound(format!("Unknown theme action: {}", action)));
    }

    download_theme(&state, &identifier).await
}

/// `GET /themes/:name/screenshot`
pub async fn theme_item(
    State(state): State<Arc<AppState>>,
    Path((name, item)): Path<(String, String)>,
    Query(query): Query<ScreenshotQueryDto>,
) -> Result<Response, ApiError> {
    if item != SCREENSHOT_ITEM {
        return Err(ApiError::NotFound(format!("Unknown theme resource: {}", item)));
    }

    theme_screenshot(&state, &name, query).await
}

pub async fn remove_theme(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Redirect, ApiError> {
    log_request(format!("DELETE /themes/{}", name));

    state
        .theme_service
        .remove_theme(&name)
        .await
        .map_err(map_api_error(format!("Failed to remove theme {}", name)))?;

    Ok(Redirect::to("/themes"))
}

async fn upload_theme(state: &AppState, mut multipart: Multipart) -> Result<SuccessBody, ApiError> {
    log_request("POST /themes/upload");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        state
            .theme_service
            .install_from_upload(&bytes, file_name.as_deref())
            .await
            .map_err(map_api_error("Failed to install uploaded theme"))?;

        return Ok(success());
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

async fn download_theme(state: &AppState, identifier: &str) -> Result<SuccessBody, ApiError> {
    log_request(format!("POST /themes/download/{}", identifier));

    state
        .theme_service
        .install_from_remote(identifier)
        .await
        .map_err(map_api_error(format!(
            "Failed to install theme {} from catalog",
            identifier
        )))?;

    Ok(success())
}

async fn set_active_theme(state: &AppState, dto: SetActiveThemeDto) -> Result<SuccessBody, ApiError> {
    log_request(format!("POST /themes/active {}", dto.theme));

    state
        .theme_service
        .set_active_theme(&dto.theme)
        .await
        .map_err(map_api_error(format!("Failed to activate theme {}", dto.theme)))?;

    Ok(success())
}

async fn theme_screenshot(
    state: &AppState,
    name: &str,
    query: ScreenshotQueryDto,
) -> Result<Response, ApiError> {
    log_request(format!("GET /themes/{}/screenshot", name));

    let asset = state
        .theme_service
        .screenshot(name, query.width, query.height)
        .await
        .map_err(map_api_error(format!("Failed to read screenshot of {}", name)))?;

    Ok(match asset {
        Some(asset) => ([(header::CONTENT_TYPE, asset.mime_type)], asset.bytes).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
