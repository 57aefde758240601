use std::fmt::Display;

use axum::Json;

use crate::infrastructure::logging::logger;
use crate::presentation::errors::ApiError;

/// Body returned by mutating endpoints on success
pub type SuccessBody = Json<[&'static str; 1]>;

pub fn success() -> SuccessBody {
    Json(["success"])
}

pub fn log_request(route: impl AsRef<str>) {
    logger::debug(&format!("Request: {}", route.as_ref()));
}

pub fn map_api_error<E>(context: impl AsRef<str>) -> impl FnOnce(E) -> ApiError
where
    E: Display + Into<ApiError>,
{
    let context = context.as_ref().to_string();

    move |error| {
        logger::error(&format!("{}: {}", context, error));
        error.into()
    }
}
