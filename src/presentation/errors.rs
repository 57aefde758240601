use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::application::errors::ApplicationError;
use crate::domain::errors::{ThemeInstallError, ThemeRemoveError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::UnprocessableEntity(msg)
            | ApiError::BadGateway(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::RemoteError(msg) => ApiError::BadGateway(msg),
            ApplicationError::InternalError(msg) => ApiError::InternalServerError(msg),
            ApplicationError::Install(error) => error.into(),
            ApplicationError::Remove(error) => error.into(),
        }
    }
}

impl From<ThemeInstallError> for ApiError {
    fn from(error: ThemeInstallError) -> Self {
        let message = error.to_string();
        match error {
            ThemeInstallError::InvalidPackage(_)
            | ThemeInstallError::ManifestMissing
            | ThemeInstallError::InvalidManifest(_) => ApiError::BadRequest(message),
            ThemeInstallError::AlreadyExists(_) => ApiError::Conflict(message),
            ThemeInstallError::ExtractFailed(_) => ApiError::UnprocessableEntity(message),
            ThemeInstallError::RemoteFetchFailed(_) => ApiError::BadGateway(message),
            ThemeInstallError::DirectoryCreateFailed(_) => ApiError::InternalServerError(message),
        }
    }
}

impl From<ThemeRemoveError> for ApiError {
    fn from(error: ThemeRemoveError) -> Self {
        let message = error.to_string();
        match error {
            ThemeRemoveError::NotFound(_) => ApiError::NotFound(message),
            ThemeRemoveError::DeleteFailed(_) => ApiError::InternalServerError(message),
        }
    }
}
