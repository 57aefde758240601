use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::{DomainError, ThemeInstallError, ThemeRemoveError};
use crate::domain::models::theme::{InstalledTheme, ScreenshotAsset, ScreenshotSize};

/// Registry of installed themes
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    /// List installed themes, active theme first
    async fn list_themes(&self) -> Result<Vec<InstalledTheme>, DomainError>;

    /// Check whether a theme is installed
    async fn has_theme(&self, name: &str) -> bool;

    /// Validate a package archive and install it under its manifest name
    async fn install_package(&self, archive_path: &Path)
        -> Result<InstalledTheme, ThemeInstallError>;

    /// Recursively delete an installed theme
    async fn remove_theme(&self, name: &str) -> Result<(), ThemeRemoveError>;

    /// Mark a theme as the active one
    async fn set_active_theme(&self, name: &str) -> Result<(), DomainError>;

    /// Read the theme screenshot, `None` when the theme ships without one
    async fn read_screenshot(
        &self,
        name: &str,
        size: Option<ScreenshotSize>,
    ) -> Result<Option<ScreenshotAsset>, DomainError>;
}
