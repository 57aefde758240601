use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::errors::DomainError;

pub const CONFIG_PATH_ENV: &str = "THEME_ADMIN_CONFIG";
pub const LISTEN_ADDR_ENV: &str = "THEME_ADMIN_LISTEN";
pub const DATA_ROOT_ENV: &str = "THEME_ADMIN_DATA_ROOT";
pub const CATALOG_URL_ENV: &str = "THEME_ADMIN_CATALOG_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data_root: PathBuf,
    pub log_dir: PathBuf,
    pub themes: ThemesConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemesConfig {
    /// Manifest file expected at the package root
    pub manifest_file: String,
    /// Theme treated as active until one is explicitly chosen
    pub default_theme: Option<String>,
    /// Keep uploaded/downloaded archives after installation
    pub keep_archives: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_archive_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data_root: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            themes: ThemesConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            // Packages built for the legacy platform carry `zedx.json`; set
            // `themes.manifest_file` to install those unchanged.
            manifest_file: "theme.json".to_string(),
            default_theme: Some("default".to_string()),
            keep_archives: false,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            max_archive_bytes: 256 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load configuration from the first CLI argument or `THEME_ADMIN_CONFIG`,
    /// then apply environment overrides.
    pub fn load() -> Result<Self, DomainError> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .map(PathBuf::from);

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a YAML configuration file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Config file {:?} not found, using defaults", path);
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(DomainError::InternalError(format!(
                    "Failed to read config file {:?}: {}",
                    path, error
                )));
            }
        };

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, DomainError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(contents)
            .map_err(|error| DomainError::InvalidData(format!("Invalid config: {}", error)))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(listen_addr) = lookup(LISTEN_ADDR_ENV) {
            self.server.listen_addr = listen_addr;
        }

        if let Some(data_root) = lookup(DATA_ROOT_ENV) {
            self.data_root = PathBuf::from(data_root);
        }

        if let Some(base_url) = lookup(CATALOG_URL_ENV) {
            let base_url = base_url.trim().to_string();
            self.catalog.base_url = (!base_url.is_empty()).then_some(base_url);
        }
    }
}
