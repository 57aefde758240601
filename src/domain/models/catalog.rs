use serde::{Deserialize, Serialize};

/// Payload returned by `GET <catalog>/theme/<identifier>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDescriptor {
    /// Archive location, relative to the catalog base or absolute
    pub archive: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Hex-encoded SHA-256 of the archive, verified when present
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A downloadable theme as listed by the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTheme {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

/// Payload returned by `GET <catalog>/theme?<query>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    pub data: Vec<CatalogTheme>,
    pub total: u64,
    pub current_page: u64,
}
