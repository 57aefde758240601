use std::sync::Arc;

use crate::application::dto::catalog_dto::CatalogPageDto;
use crate::application::errors::ApplicationError;
use crate::domain::repositories::theme_catalog_repository::ThemeCatalogRepository;
use crate::infrastructure::logging::logger;

/// Themes shown per catalog page
pub const CATALOG_PER_PAGE: u64 = 10;

/// Service for browsing the remote theme catalog
pub struct CatalogService {
    catalog_repository: Arc<dyn ThemeCatalogRepository>,
}

impl CatalogService {
    pub fn new(catalog_repository: Arc<dyn ThemeCatalogRepository>) -> Self {
        Self { catalog_repository }
    }

    /// Fetch one catalog page, forwarding the caller's query string as-is
    pub async fn browse(
        &self,
        query: &[(String, String)],
    ) -> Result<CatalogPageDto, ApplicationError> {
        logger::debug(&format!("Browsing theme catalog: {:?}", query));

        let page = self.catalog_repository.search(query).await.map_err(|e| {
            logger::error(&format!("Failed to browse theme catalog: {}", e));
            ApplicationError::from(e)
        })?;

        Ok(CatalogPageDto {
            last_page: last_page(page.total),
            data: page.data,
            total: page.total,
            per_page: CATALOG_PER_PAGE,
            current_page: page.current_page.max(1),
        })
    }
}

fn last_page(total: u64) -> u64 {
    total.div_ceil(CATALOG_PER_PAGE).max(1)
}
