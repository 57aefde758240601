use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::CatalogError;
use crate::domain::models::catalog::{CatalogDescriptor, CatalogPage};

/// Remote catalog of downloadable themes
#[async_trait]
pub trait ThemeCatalogRepository: Send + Sync {
    /// Fetch the descriptor of a single theme
    async fn fetch_descriptor(&self, identifier: &str) -> Result<CatalogDescriptor, CatalogError>;

    /// Download the archive named by a descriptor into `destination`
    async fn download_archive(
        &self,
        descriptor: &CatalogDescriptor,
        destination: &Path,
    ) -> Result<u64, CatalogError>;

    /// Fetch one page of the catalog listing
    async fn search(&self, query: &[(String, String)]) -> Result<CatalogPage, CatalogError>;
}
