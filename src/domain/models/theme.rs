use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest theme name accepted as a directory name.
pub const MAX_THEME_NAME_LENGTH: usize = 128;

/// Metadata file shipped at the root of every theme package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeManifest {
    /// Unique theme name, also used as the install directory name
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ThemeManifest {
    /// Parse and validate a manifest payload
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        let mut manifest: ThemeManifest =
            serde_json::from_slice(bytes).map_err(|error| error.to_string())?;

        manifest.name = manifest.name.trim().to_string();
        validate_theme_name(&manifest.name)?;

        Ok(manifest)
    }
}

/// A theme directory present in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledTheme {
    pub name: String,
    pub directory_path: PathBuf,
    pub is_active: bool,
    pub manifest: Option<ThemeManifest>,
}

/// Persisted registry state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeRegistryState {
    #[serde(default)]
    pub active_theme: Option<String>,
}

/// Requested screenshot bounds; the image keeps its aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenshotSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ScreenshotAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Check that a theme name can be used verbatim as a directory name.
///
/// Unlike the filename sanitizer used for user content, invalid names are
/// rejected rather than rewritten: the name is the theme's identity.
pub fn validate_theme_name(name: &str) -> Result<(), String> {
    const INVALID_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    if name.trim().is_empty() {
        return Err("Theme name must not be empty".to_string());
    }

    if name != name.trim() {
        return Err(format!("Theme name has surrounding whitespace: {:?}", name));
    }

    if name.chars().count() > MAX_THEME_NAME_LENGTH {
        return Err(format!(
            "Theme name is longer than {} characters",
            MAX_THEME_NAME_LENGTH
        ));
    }

    if name.starts_with('.') {
        return Err(format!("Theme name must not start with '.': {}", name));
    }

    if let Some(c) = name
        .chars()
        .find(|c| INVALID_CHARS.contains(c) || c.is_control())
    {
        return Err(format!("Theme name contains invalid character {:?}", c));
    }

    Ok(())
}
