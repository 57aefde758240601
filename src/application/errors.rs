use thiserror::Error;

use crate::domain::errors::{CatalogError, DomainError, ThemeInstallError, ThemeRemoveError};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error: {0}")]
    RemoteError(String),

    #[error(transparent)]
    Install(#[from] ThemeInstallError),

    #[error(transparent)]
    Remove(#[from] ThemeRemoveError),
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::NotFound(msg) => ApplicationError::NotFound(msg),
            DomainError::InvalidData(msg) => ApplicationError::ValidationError(msg),
            DomainError::InternalError(msg) => ApplicationError::InternalError(msg),
        }
    }
}

impl From<CatalogError> for ApplicationError {
    fn from(error: CatalogError) -> Self {
        ApplicationError::RemoteError(error.to_string())
    }
}
