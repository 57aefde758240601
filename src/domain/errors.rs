use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Outcomes of a theme package installation that callers are expected to handle.
#[derive(Error, Debug)]
pub enum ThemeInstallError {
    #[error("Invalid theme package: {0}")]
    InvalidPackage(String),

    #[error("Theme manifest is missing from the package")]
    ManifestMissing,

    #[error("Invalid theme manifest: {0}")]
    InvalidManifest(String),

    #[error("Theme already exists: {0}")]
    AlreadyExists(String),

    #[error("Failed to create theme directory: {0}")]
    DirectoryCreateFailed(String),

    #[error("Failed to extract theme package: {0}")]
    ExtractFailed(String),

    #[error("Failed to fetch theme from catalog: {0}")]
    RemoteFetchFailed(String),
}

#[derive(Error, Debug)]
pub enum ThemeRemoveError {
    #[error("Theme not found: {0}")]
    NotFound(String),

    #[error("Failed to delete theme directory: {0}")]
    DeleteFailed(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Theme catalog is not configured")]
    NotConfigured,

    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Catalog responded with HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed catalog payload: {0}")]
    Decode(String),

    #[error("Theme archive exceeds {limit} bytes")]
    ArchiveTooLarge { limit: u64 },

    #[error("Theme archive checksum mismatch (expected {expected}, got {actual})")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Failed to store downloaded archive: {0}")]
    Io(String),
}

impl From<CatalogError> for ThemeInstallError {
    fn from(error: CatalogError) -> Self {
        ThemeInstallError::RemoteFetchFailed(error.to_string())
    }
}
