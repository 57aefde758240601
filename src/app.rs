use std::sync::Arc;

use crate::application::services::catalog_service::CatalogService;
use crate::application::services::theme_service::ThemeService;
use crate::domain::errors::DomainError;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::file_system::DataDirectory;

mod bootstrap;

pub struct AppState {
    pub config: AppConfig,
    pub data_directory: DataDirectory,
    pub theme_service: Arc<ThemeService>,
    pub catalog_service: Arc<CatalogService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, DomainError> {
        tracing::info!(
            "Initializing application with data root: {:?}",
            config.data_root
        );

        let data_directory = bootstrap::initialize_data_directory(&config.data_root).await?;
        let services = bootstrap::build_services(&config, &data_directory)?;

        tracing::info!("Application initialized successfully");

        Ok(Self {
            config,
            data_directory,
            theme_service: services.theme_service,
            catalog_service: services.catalog_service,
        })
    }
}
