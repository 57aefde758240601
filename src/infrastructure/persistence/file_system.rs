use crate::domain::errors::DomainError;
use crate::infrastructure::logging::logger;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self as tokio_fs, create_dir_all, read_to_string};

/// Represents the service data directory structure
pub struct DataDirectory {
    root: PathBuf,
    themes: PathBuf,
    staging: PathBuf,
    archives: PathBuf,
    registry_state: PathBuf,
}

impl DataDirectory {
    /// Create a new DataDirectory instance
    pub fn new(root: PathBuf) -> Self {
        let themes = root.join("themes");
        let staging = themes.join(".staging");
        let archives = root.join("archives");
        let registry_state = root.join("theme-state.json");

        Self {
            root,
            themes,
            staging,
            archives,
            registry_state,
        }
    }

    /// Initialize the data directory structure
    pub async fn initialize(&self) -> Result<(), DomainError> {
        tracing::info!("Initializing data directory at: {:?}", self.root);

        for dir in [&self.root, &self.themes, &self.staging, &self.archives] {
            self.create_directory(dir).await?;
        }

        tracing::info!("Data directory initialized successfully");
        Ok(())
    }

    /// Create a directory if it doesn't exist
    async fn create_directory(&self, path: &Path) -> Result<(), DomainError> {
        if !path.exists() {
            tracing::info!("Creating directory: {:?}", path);
            create_dir_all(path).await.map_err(|e| {
                tracing::error!("Failed to create directory {:?}: {}", path, e);
                DomainError::InternalError(format!("Failed to create directory: {}", e))
            })?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per installed theme
    pub fn themes(&self) -> &Path {
        &self.themes
    }

    /// Scratch space for extractions; lives under `themes` so the final
    /// rename never crosses a filesystem boundary
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Temporary home of uploaded and downloaded archives
    pub fn archives(&self) -> &Path {
        &self.archives
    }

    pub fn registry_state(&self) -> &Path {
        &self.registry_state
    }
}

/// Read a JSON file and deserialize it
pub async fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    logger::debug(&format!("Reading JSON file: {:?}", path));

    let contents = read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DomainError::NotFound(format!("File not found: {}", path.display()))
        } else {
            logger::error(&format!("Failed to read file {:?}: {}", path, e));
            DomainError::InternalError(format!("Failed to read file: {}", e))
        }
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        logger::error(&format!("Failed to parse JSON from file {:?}: {}", path, e));
        DomainError::InvalidData(format!("Invalid JSON: {}", e))
    })
}

/// Write a JSON file
///
/// The payload lands in a sibling temp file first and is renamed over the
/// target, so readers never observe a half-written document.
pub async fn write_json_file<T: Serialize>(path: &Path, data: &T) -> Result<(), DomainError> {
    logger::debug(&format!("Writing JSON file: {:?}", path));

    if let Some(parent) = path.parent() {
        create_dir_all(parent).await.map_err(|e| {
            logger::error(&format!(
                "Failed to create parent directory for {:?}: {}",
                path, e
            ));
            DomainError::InternalError(format!("Failed to create directory: {}", e))
        })?;
    }

    let json = serde_json::to_string_pretty(data).map_err(|e| {
        logger::error(&format!(
            "Failed to serialize to JSON for file {:?}: {}",
            path, e
        ));
        DomainError::InvalidData(format!("Failed to serialize to JSON: {}", e))
    })?;

    let temp_path = path.with_extension("json.tmp");
    tokio_fs::write(&temp_path, json).await.map_err(|e| {
        logger::error(&format!("Failed to write to file {:?}: {}", temp_path, e));
        DomainError::InternalError(format!("Failed to write to file: {}", e))
    })?;

    tokio_fs::rename(&temp_path, path).await.map_err(|e| {
        logger::error(&format!("Failed to finalize file {:?}: {}", path, e));
        DomainError::InternalError(format!("Failed to write to file: {}", e))
    })?;

    Ok(())
}

/// Delete a file
pub async fn delete_file(path: &Path) -> Result<(), DomainError> {
    logger::debug(&format!("Deleting file: {:?}", path));

    match tokio_fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            logger::error(&format!("Failed to delete file {:?}: {}", path, e));
            Err(DomainError::InternalError(format!(
                "Failed to delete file: {}",
                e
            )))
        }
    }
}

/// Best-effort recursive removal used when unwinding a failed operation
pub async fn cleanup_directory(path: &Path) {
    if let Err(error) = tokio_fs::remove_dir_all(path).await {
        if error.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to clean up directory {}: {}", path.display(), error);
        }
    }
}
