use serde::{Deserialize, Serialize};

use crate::domain::models::catalog::CatalogTheme;

/// A catalog page with enough information to render pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPageDto {
    pub data: Vec<CatalogTheme>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}
