use serde::{Deserialize, Serialize};

use crate::domain::models::theme::{InstalledTheme, ThemeManifest};

/// DTO for an installed theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeDto {
    pub name: String,
    pub directory_path: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<InstalledTheme> for ThemeDto {
    fn from(theme: InstalledTheme) -> Self {
        let (version, author, description) = match theme.manifest {
            Some(ThemeManifest {
                version,
                author,
                description,
                ..
            }) => (version, author, description),
            None => (None, None, None),
        };

        Self {
            name: theme.name,
            directory_path: theme.directory_path.to_string_lossy().into_owned(),
            is_active: theme.is_active,
            version,
            author,
            description,
        }
    }
}

/// Response for the theme listing: the active theme and the other installed ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeListDto {
    pub current: Option<ThemeDto>,
    pub themes: Vec<ThemeDto>,
}

/// DTO for switching the active theme
#[derive(Debug, Serialize, Deserialize)]
pub struct SetActiveThemeDto {
    pub theme: String,
}

/// Optional resize bounds for a screenshot request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScreenshotQueryDto {
    pub width: Option<u32>,
    pub height: Option<u32>,
}
