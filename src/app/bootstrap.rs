use std::path::Path;
use std::sync::Arc;

use crate::application::services::catalog_service::CatalogService;
use crate::application::services::theme_service::ThemeService;
use crate::domain::errors::DomainError;
use crate::domain::repositories::theme_catalog_repository::ThemeCatalogRepository;
use crate::domain::repositories::theme_repository::ThemeRepository;
use crate::infrastructure::apis::http_theme_catalog_repository::HttpThemeCatalogRepository;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::build_catalog_client;
use crate::infrastructure::persistence::file_system::DataDirectory;
use crate::infrastructure::repositories::file_theme_repository::FileThemeRepository;

pub(super) struct AppServices {
    pub theme_service: Arc<ThemeService>,
    pub catalog_service: Arc<CatalogService>,
}

struct AppRepositories {
    theme_repository: Arc<dyn ThemeRepository>,
    catalog_repository: Arc<dyn ThemeCatalogRepository>,
}

pub(super) async fn initialize_data_directory(
    data_root: &Path,
) -> Result<DataDirectory, DomainError> {
    let data_directory = DataDirectory::new(data_root.to_path_buf());
    data_directory.initialize().await?;
    Ok(data_directory)
}

pub(super) fn build_services(
    config: &AppConfig,
    data_directory: &DataDirectory,
) -> Result<AppServices, DomainError> {
    let repositories = build_repositories(config, data_directory)?;

    let theme_service = Arc::new(ThemeService::new(
        repositories.theme_repository,
        repositories.catalog_repository.clone(),
        data_directory.archives().to_path_buf(),
        config.themes.keep_archives,
        config.server.max_upload_bytes as u64,
    ));
    let catalog_service = Arc::new(CatalogService::new(repositories.catalog_repository));

    Ok(AppServices {
        theme_service,
        catalog_service,
    })
}

fn build_repositories(
    config: &AppConfig,
    data_directory: &DataDirectory,
) -> Result<AppRepositories, DomainError> {
    let theme_repository: Arc<dyn ThemeRepository> = Arc::new(FileThemeRepository::new(
        data_directory.themes().to_path_buf(),
        data_directory.staging().to_path_buf(),
        data_directory.registry_state().to_path_buf(),
        config.themes.manifest_file.clone(),
        config.themes.default_theme.clone(),
    ));

    let client = build_catalog_client(config.catalog.timeout_secs).map_err(|e| {
        DomainError::InternalError(format!("Failed to build catalog HTTP client: {}", e))
    })?;

    if config.catalog.base_url.is_none() {
        tracing::warn!("No theme catalog configured; remote installs are disabled");
    }

    let catalog_repository: Arc<dyn ThemeCatalogRepository> =
        Arc::new(HttpThemeCatalogRepository::new(
            client,
            config.catalog.base_url.as_deref(),
            config.catalog.max_archive_bytes,
        )
        .map_err(|e| DomainError::InvalidData(e.to_string()))?);

    Ok(AppRepositories {
        theme_repository,
        catalog_repository,
    })
}
