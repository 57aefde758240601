use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs as tokio_fs;
use uuid::Uuid;

use crate::domain::errors::{DomainError, ThemeInstallError, ThemeRemoveError};
use crate::domain::models::theme::{
    validate_theme_name, InstalledTheme, ScreenshotAsset, ScreenshotSize, ThemeManifest,
    ThemeRegistryState,
};
use crate::domain::repositories::theme_repository::ThemeRepository;
use crate::infrastructure::logging::logger;
use crate::infrastructure::persistence::file_system::{
    cleanup_directory, read_json_file, write_json_file,
};
use crate::infrastructure::persistence::screenshot::{self, SCREENSHOT_FILE_NAME};
use crate::infrastructure::persistence::theme_archive::{extract_package, read_package_manifest};


/// Themes directory backed registry: one subdirectory per installed theme
pub struct FileThemeRepository {
    themes_dir: PathBuf,
    staging_dir: PathBuf,
    state_file: PathBuf,
    manifest_file: String,
    default_theme: Option<String>,
    /// Names with an install in flight
    installing: Mutex<HashSet<String>>,
    state_lock: tokio::sync::Mutex<()>,
}

/// Holds a theme name for the duration of one install
struct InstallReservation<'a> {
    installing: &'a Mutex<HashSet<String>>,
    name: String,
}

impl Drop for InstallReservation<'_> {
    fn drop(&mut self) {
        let mut installing = self
            .installing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        installing.remove(&self.name);
    }
}

impl FileThemeRepository {
    pub fn new(
        themes_dir: PathBuf,
        staging_dir: PathBuf,
        state_file: PathBuf,
        manifest_file: impl Into<String>,
        default_theme: Option<String>,
    ) -> Self {
        Self {
            themes_dir,
            staging_dir,
            state_file,
            manifest_file: manifest_file.into(),
            default_theme,
            installing: Mutex::new(HashSet::new()),
            state_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<(), String> {
        if !path.exists() {
            tokio_fs::create_dir_all(path).await.map_err(|e| {
                logger::error(&format!("Failed to create directory {:?}: {}", path, e));
                format!("Failed to create directory {:?}: {}", path, e)
            })?;
        }

        Ok(())
    }

    /// Directory of a theme; `None` for names that can never be installed
    fn theme_path(&self, name: &str) -> Option<PathBuf> {
        validate_theme_name(name).ok()?;
        Some(self.themes_dir.join(name))
    }

    fn installed_theme_path(&self, name: &str) -> Option<PathBuf> {
        self.theme_path(name).filter(|path| path.is_dir())
    }

    fn reserve(&self, name: &str) -> Option<InstallReservation<'_>> {
        let mut installing = self
            .installing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !installing.insert(name.to_string()) {
            return None;
        }

        Some(InstallReservation {
            installing: &self.installing,
            name: name.to_string(),
        })
    }

    async fn read_state(&self) -> Result<ThemeRegistryState, DomainError> {
        match read_json_file::<ThemeRegistryState>(&self.state_file).await {
            Ok(state) => Ok(state),
            Err(DomainError::NotFound(_)) => Ok(ThemeRegistryState::default()),
            Err(error) => Err(error),
        }
    }

    /// The explicitly chosen theme when still installed, else the default one
    async fn resolve_active_theme(&self) -> Option<String> {
        let state = match self.read_state().await {
            Ok(state) => state,
            Err(error) => {
                tracing::warn!("Failed to read theme registry state: {}", error);
                ThemeRegistryState::default()
            }
        };

        [state.active_theme, self.default_theme.clone()]
            .into_iter()
            .flatten()
            .find(|name| self.installed_theme_path(name).is_some())
    }

    async fn read_installed_manifest(&self, theme_dir: &Path) -> Option<ThemeManifest> {
        let manifest_path = theme_dir.join(&self.manifest_file);
        let bytes = tokio_fs::read(&manifest_path).await.ok()?;

        match ThemeManifest::from_slice(&bytes) {
            Ok(manifest) => Some(manifest),
            Err(error) => {
                tracing::warn!("Ignoring invalid manifest {:?}: {}", manifest_path, error);
                None
            }
        }
    }

    async fn create_staging_directory(&self) -> Result<PathBuf, ThemeInstallError> {
        self.ensure_directory_exists(&self.staging_dir)
            .await
            .map_err(ThemeInstallError::DirectoryCreateFailed)?;

        let staging_path = self.staging_dir.join(Uuid::new_v4().simple().to_string());

        let mut builder = tokio_fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o755);

        builder.create(&staging_path).await.map_err(|e| {
            logger::error(&format!(
                "Failed to create staging directory {:?}: {}",
                staging_path, e
            ));
            ThemeInstallError::DirectoryCreateFailed(format!(
                "Failed to create staging directory: {}",
                e
            ))
        })?;

        Ok(staging_path)
    }
}

#[async_trait]
impl ThemeRepository for FileThemeRepository {
    async fn list_themes(&self) -> Result<Vec<InstalledTheme>, DomainError> {
        logger::debug(&format!("Listing themes in {:?}", self.themes_dir));

        if !self.themes_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = tokio_fs::read_dir(&self.themes_dir).await.map_err(|e| {
            logger::error(&format!("Failed to read themes directory: {}", e));
            DomainError::InternalError(format!("Failed to read themes directory: {}", e))
        })?;

        let active_theme = self.resolve_active_theme().await;
        let mut themes = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            logger::error(&format!("Failed to read directory entry: {}", e));
            DomainError::InternalError(format!("Failed to read directory entry: {}", e))
        })? {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            // Hidden entries are staging areas, never themes
            if validate_theme_name(&name).is_err() {
                continue;
            }

            let manifest = self.read_installed_manifest(&path).await;

            themes.push(InstalledTheme {
                is_active: active_theme.as_deref() == Some(name.as_str()),
                name,
                directory_path: path,
                manifest,
            });
        }

        themes.sort_by(|left, right| {
            right
                .is_active
                .cmp(&left.is_active)
                .then_with(|| left.name.cmp(&right.name))
        });

        Ok(themes)
    }

    async fn has_theme(&self, name: &str) -> bool {
        self.installed_theme_path(name).is_some()
    }

    async fn install_package(
        &self,
        archive_path: &Path,
    ) -> Result<InstalledTheme, ThemeInstallError> {
        tracing::info!("Installing theme package {:?}", archive_path);

        let manifest_file = self.manifest_file.clone();
        let archive = archive_path.to_path_buf();
        let package =
            tokio::task::spawn_blocking(move || read_package_manifest(&archive, &manifest_file))
                .await
                .map_err(|e| {
                    ThemeInstallError::InvalidPackage(format!("Manifest task failed: {}", e))
                })??;

        let name = package.manifest.name.clone();
        let destination = self.themes_dir.join(&name);

        let Some(_reservation) = self.reserve(&name) else {
            tracing::warn!("Theme {} is already being installed", name);
            return Err(ThemeInstallError::AlreadyExists(name));
        };

        if destination.exists() {
            return Err(ThemeInstallError::AlreadyExists(name));
        }

        self.ensure_directory_exists(&self.themes_dir)
            .await
            .map_err(ThemeInstallError::DirectoryCreateFailed)?;

        let staging_path = self.create_staging_directory().await?;

        let archive = archive_path.to_path_buf();
        let root_prefix = package.root_prefix.clone();
        let extract_target = staging_path.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            extract_package(&archive, &root_prefix, &extract_target)
        })
        .await
        .map_err(|e| ThemeInstallError::ExtractFailed(format!("Extraction task failed: {}", e)))
        .and_then(|result| result);

        let summary = match extracted {
            Ok(summary) => summary,
            Err(error) => {
                logger::error(&format!("Failed to extract theme {}: {}", name, error));
                cleanup_directory(&staging_path).await;
                return Err(error);
            }
        };

        // Renaming onto a non-empty directory fails, so a concurrent installer
        // in another process cannot clobber a finished theme
        if let Err(error) = tokio_fs::rename(&staging_path, &destination).await {
            cleanup_directory(&staging_path).await;

            if destination.exists() {
                return Err(ThemeInstallError::AlreadyExists(name));
            }

            logger::error(&format!(
                "Failed to move theme {} into place: {}",
                name, error
            ));
            return Err(ThemeInstallError::DirectoryCreateFailed(format!(
                "Failed to move theme into place: {}",
                error
            )));
        }

        tracing::info!(
            "Theme installed: {} ({} files, {} bytes)",
            name,
            summary.files,
            summary.bytes
        );

        let is_active = self.resolve_active_theme().await.as_deref() == Some(name.as_str());

        Ok(InstalledTheme {
            name,
            directory_path: destination,
            is_active,
            manifest: Some(package.manifest),
        })
    }

    async fn remove_theme(&self, name: &str) -> Result<(), ThemeRemoveError> {
        tracing::info!("Removing theme: {}", name);

        let Some(path) = self.installed_theme_path(name) else {
            return Err(ThemeRemoveError::NotFound(name.to_string()));
        };

        tokio_fs::remove_dir_all(&path).await.map_err(|e| {
            logger::error(&format!("Failed to remove theme directory {:?}: {}", path, e));
            ThemeRemoveError::DeleteFailed(format!("Failed to remove theme directory: {}", e))
        })?;

        let _guard = self.state_lock.lock().await;
        match self.read_state().await {
            Ok(state) if state.active_theme.as_deref() == Some(name) => {
                if let Err(error) =
                    write_json_file(&self.state_file, &ThemeRegistryState::default()).await
                {
                    tracing::warn!("Failed to clear active theme {}: {}", name, error);
                }
            }
            Ok(_) => {}
            Err(error) => tracing::warn!("Failed to read theme registry state: {}", error),
        }

        tracing::info!("Theme removed: {}", name);
        Ok(())
    }

    async fn set_active_theme(&self, name: &str) -> Result<(), DomainError> {
        tracing::info!("Setting active theme: {}", name);

        if self.installed_theme_path(name).is_none() {
            return Err(DomainError::NotFound(format!("Theme not found: {}", name)));
        }

        let _guard = self.state_lock.lock().await;
        let mut state = self.read_state().await?;
        state.active_theme = Some(name.to_string());
        write_json_file(&self.state_file, &state).await
    }

    async fn read_screenshot(
        &self,
        name: &str,
        size: Option<ScreenshotSize>,
    ) -> Result<Option<ScreenshotAsset>, DomainError> {
        let Some(path) = self.installed_theme_path(name) else {
            return Err(DomainError::NotFound(format!("Theme not found: {}", name)));
        };

        screenshot::read_screenshot(&path.join(SCREENSHOT_FILE_NAME), size).await
    }
}
