use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs as tokio_fs;
use uuid::Uuid;

use crate::application::dto::theme_dto::{ThemeDto, ThemeListDto};
use crate::application::errors::ApplicationError;
use crate::domain::errors::{ThemeInstallError, ThemeRemoveError};
use crate::domain::models::theme::{validate_theme_name, ScreenshotAsset, ScreenshotSize};
use crate::domain::repositories::theme_catalog_repository::ThemeCatalogRepository;
use crate::domain::repositories::theme_repository::ThemeRepository;
use crate::infrastructure::logging::logger;
use crate::infrastructure::persistence::file_system::delete_file;
use crate::infrastructure::persistence::screenshot::MAX_SCREENSHOT_EDGE;

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: &[u8] = b"PK\x05\x06";

/// Service for installing, removing and activating themes
pub struct ThemeService {
    theme_repository: Arc<dyn ThemeRepository>,
    catalog_repository: Arc<dyn ThemeCatalogRepository>,
    archives_dir: PathBuf,
    keep_archives: bool,
    max_upload_bytes: u64,
}

impl ThemeService {
    pub fn new(
        theme_repository: Arc<dyn ThemeRepository>,
        catalog_repository: Arc<dyn ThemeCatalogRepository>,
        archives_dir: PathBuf,
        keep_archives: bool,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            theme_repository,
            catalog_repository,
            archives_dir,
            keep_archives,
            max_upload_bytes,
        }
    }

    /// Install a theme from an uploaded archive
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw archive contents
    /// * `file_name` - Client supplied file name, only used for logging
    ///
    /// # Returns
    ///
    /// * `Result<String, ThemeInstallError>` - Name of the installed theme
    pub async fn install_from_upload(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
    ) -> Result<String, ThemeInstallError> {
        logger::debug(&format!(
            "Installing uploaded theme package {} ({} bytes)",
            file_name.unwrap_or("<unnamed>"),
            bytes.len()
        ));

        self.validate_upload(bytes)?;

        let archive_path = self
            .archive_path(&format!("upload_{}.zip", Uuid::new_v4().simple()))
            .await?;

        tokio_fs::write(&archive_path, bytes).await.map_err(|e| {
            logger::error(&format!("Failed to store uploaded archive: {}", e));
            ThemeInstallError::DirectoryCreateFailed(format!(
                "Failed to store uploaded archive: {}",
                e
            ))
        })?;

        let result = self.theme_repository.install_package(&archive_path).await;
        self.discard_archive(&archive_path).await;

        let theme = result?;
        logger::info(&format!("Theme installed from upload: {}", theme.name));
        Ok(theme.name)
    }

    /// Install a theme published in the remote catalog
    ///
    /// # Arguments
    ///
    /// * `identifier` - Catalog identifier of the theme
    ///
    /// # Returns
    ///
    /// * `Result<String, ThemeInstallError>` - Name of the installed theme
    pub async fn install_from_remote(&self, identifier: &str) -> Result<String, ThemeInstallError> {
        logger::debug(&format!("Installing theme {} from catalog", identifier));

        validate_theme_name(identifier).map_err(|e| {
            ThemeInstallError::InvalidPackage(format!("Invalid catalog identifier: {}", e))
        })?;

        let descriptor = self
            .catalog_repository
            .fetch_descriptor(identifier)
            .await
            .map_err(|e| {
                logger::error(&format!("Failed to fetch descriptor for {}: {}", identifier, e));
                ThemeInstallError::from(e)
            })?;

        // Skip the download when the catalog already tells us the name
        if let Some(listed_name) = descriptor.name.as_deref() {
            if self.theme_repository.has_theme(listed_name).await {
                return Err(ThemeInstallError::AlreadyExists(listed_name.to_string()));
            }
        }

        let archive_path = self.archive_path(&remote_archive_name(identifier)).await?;

        if let Err(error) = self
            .catalog_repository
            .download_archive(&descriptor, &archive_path)
            .await
        {
            logger::error(&format!("Failed to download theme {}: {}", identifier, error));
            self.discard_archive(&archive_path).await;
            return Err(error.into());
        }

        let result = self.theme_repository.install_package(&archive_path).await;
        self.discard_archive(&archive_path).await;

        let theme = result?;
        if let Some(listed_name) = descriptor.name.as_deref() {
            if listed_name != theme.name {
                logger::warn(&format!(
                    "Catalog entry {} is listed as {} but installed as {}",
                    identifier, listed_name, theme.name
                ));
            }
        }

        logger::info(&format!(
            "Theme installed from catalog: {} ({})",
            theme.name, identifier
        ));
        Ok(theme.name)
    }

    /// Remove an installed theme
    pub async fn remove_theme(&self, name: &str) -> Result<(), ThemeRemoveError> {
        logger::debug(&format!("Removing theme: {}", name));

        self.theme_repository.remove_theme(name).await.map_err(|e| {
            logger::warn(&format!("Failed to remove theme {}: {}", name, e));
            e
        })
    }

    /// List installed themes; the active one is reported as `current` and
    /// left out of `themes`
    pub async fn list_themes(&self) -> Result<ThemeListDto, ApplicationError> {
        let (active, themes): (Vec<ThemeDto>, Vec<ThemeDto>) = self
            .theme_repository
            .list_themes()
            .await?
            .into_iter()
            .map(ThemeDto::from)
            .partition(|theme| theme.is_active);

        Ok(ThemeListDto {
            current: active.into_iter().next(),
            themes,
        })
    }

    pub async fn set_active_theme(&self, name: &str) -> Result<(), ApplicationError> {
        logger::debug(&format!("Setting active theme: {}", name));

        self.theme_repository.set_active_theme(name).await?;

        logger::info(&format!("Active theme is now {}", name));
        Ok(())
    }

    /// Read a theme screenshot, resized when either bound is given
    pub async fn screenshot(
        &self,
        name: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Option<ScreenshotAsset>, ApplicationError> {
        let size = match (width, height) {
            (None, None) => None,
            (Some(0), _) | (_, Some(0)) => {
                return Err(ApplicationError::ValidationError(
                    "Screenshot bounds must be positive".to_string(),
                ));
            }
            (width, height) => Some(ScreenshotSize {
                width: width.unwrap_or(MAX_SCREENSHOT_EDGE),
                height: height.unwrap_or(MAX_SCREENSHOT_EDGE),
            }),
        };

        Ok(self.theme_repository.read_screenshot(name, size).await?)
    }

    fn validate_upload(&self, bytes: &[u8]) -> Result<(), ThemeInstallError> {
        if bytes.is_empty() {
            return Err(ThemeInstallError::InvalidPackage(
                "Uploaded file is empty".to_string(),
            ));
        }

        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(ThemeInstallError::InvalidPackage(format!(
                "Uploaded file exceeds {} bytes",
                self.max_upload_bytes
            )));
        }

        if !bytes.starts_with(ZIP_LOCAL_HEADER) && !bytes.starts_with(ZIP_EMPTY_ARCHIVE) {
            return Err(ThemeInstallError::InvalidPackage(
                "Uploaded file is not a zip archive".to_string(),
            ));
        }

        Ok(())
    }

    async fn archive_path(&self, file_name: &str) -> Result<PathBuf, ThemeInstallError> {
        tokio_fs::create_dir_all(&self.archives_dir)
            .await
            .map_err(|e| {
                logger::error(&format!("Failed to create archives directory: {}", e));
                ThemeInstallError::DirectoryCreateFailed(format!(
                    "Failed to create archives directory: {}",
                    e
                ))
            })?;

        Ok(self.archives_dir.join(file_name))
    }

    async fn discard_archive(&self, path: &Path) {
        if self.keep_archives {
            logger::debug(&format!("Keeping theme archive {:?}", path));
            return;
        }

        if let Err(error) = delete_file(path).await {
            logger::warn(&format!("Failed to delete theme archive {:?}: {}", path, error));
        }
    }
}

/// Temp file name for a catalog download; unique per attempt so parallel
/// installs of one identifier never share a file
fn remote_archive_name(identifier: &str) -> String {
    format!(
        "{}_{}_{}.zip",
        identifier,
        chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CatalogError;
    use crate::domain::models::catalog::{CatalogDescriptor, CatalogPage};
    use crate::infrastructure::persistence::file_system::DataDirectory;
    use crate::infrastructure::repositories::file_theme_repository::FileThemeRepository;
    use crate::test_support::{theme_zip, unique_temp_root};
    use async_trait::async_trait;
    use std::collections::HashMap;

    // Mock catalog serving archives from memory
    struct MockCatalogRepository {
        descriptors: HashMap<String, CatalogDescriptor>,
        archives: HashMap<String, Vec<u8>>,
    }

    impl MockCatalogRepository {
        fn new() -> Self {
            Self {
                descriptors: HashMap::new(),
                archives: HashMap::new(),
            }
        }

        fn with_theme(mut self, identifier: &str, archive: &str, bytes: Vec<u8>) -> Self {
            self.descriptors.insert(
                identifier.to_string(),
                CatalogDescriptor {
                    archive: archive.to_string(),
                    name: None,
                    sha256: None,
                },
            );
            self.archives.insert(archive.to_string(), bytes);
            self
        }
    }

    #[async_trait]
    impl ThemeCatalogRepository for MockCatalogRepository {
        async fn fetch_descriptor(
            &self,
            identifier: &str,
        ) -> Result<CatalogDescriptor, CatalogError> {
            self.descriptors
                .get(identifier)
                .cloned()
                .ok_or_else(|| CatalogError::Status {
                    status: 404,
                    url: format!("mock://theme/{}", identifier),
                })
        }

        async fn download_archive(
            &self,
            descriptor: &CatalogDescriptor,
            destination: &Path,
        ) -> Result<u64, CatalogError> {
            let bytes = self
                .archives
                .get(&descriptor.archive)
                .ok_or_else(|| CatalogError::Status {
                    status: 404,
                    url: format!("mock://{}", descriptor.archive),
                })?;

            tokio_fs::write(destination, bytes)
                .await
                .map_err(|e| CatalogError::Io(e.to_string()))?;
            Ok(bytes.len() as u64)
        }

        async fn search(&self, _query: &[(String, String)]) -> Result<CatalogPage, CatalogError> {
            Ok(CatalogPage {
                data: Vec::new(),
                total: 0,
                current_page: 1,
            })
        }
    }

    async fn setup_service(
        catalog: MockCatalogRepository,
        keep_archives: bool,
    ) -> (ThemeService, DataDirectory) {
        let data_directory = DataDirectory::new(unique_temp_root("theme-service"));
        data_directory
            .initialize()
            .await
            .expect("initialize data directory");

        let theme_repository = Arc::new(FileThemeRepository::new(
            data_directory.themes().to_path_buf(),
            data_directory.staging().to_path_buf(),
            data_directory.registry_state().to_path_buf(),
            "theme.json",
            None,
        ));

        let service = ThemeService::new(
            theme_repository,
            Arc::new(catalog),
            data_directory.archives().to_path_buf(),
            keep_archives,
            1024 * 1024,
        );

        (service, data_directory)
    }

    async fn archive_count(data_directory: &DataDirectory) -> usize {
        let mut entries = tokio_fs::read_dir(data_directory.archives())
            .await
            .expect("read archives dir");
        let mut count = 0;
        while entries.next_entry().await.expect("read entry").is_some() {
            count += 1;
        }
        count
    }

    fn names(list: &ThemeListDto) -> Vec<&str> {
        list.themes.iter().map(|theme| theme.name.as_str()).collect()
    }

    #[tokio::test]
    async fn upload_installs_theme_and_discards_archive() {
        let (service, data_directory) = setup_service(MockCatalogRepository::new(), false).await;

        let name = service
            .install_from_upload(&theme_zip("Aurora"), Some("aurora.zip"))
            .await
            .expect("install from upload");

        assert_eq!(name, "Aurora");
        let list = service.list_themes().await.expect("list themes");
        assert_eq!(names(&list), vec!["Aurora"]);
        assert_eq!(list.themes[0].version.as_deref(), Some("1.0.0"));
        assert_eq!(archive_count(&data_directory).await, 0);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn upload_keeps_archive_when_configured() {
        let (service, data_directory) = setup_service(MockCatalogRepository::new(), true).await;

        service
            .install_from_upload(&theme_zip("Kept"), None)
            .await
            .expect("install from upload");

        assert_eq!(archive_count(&data_directory).await, 1);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn upload_that_is_not_a_zip_is_rejected() {
        let (service, data_directory) = setup_service(MockCatalogRepository::new(), false).await;

        for bytes in [&b""[..], &b"<html>not a zip</html>"[..]] {
            let result = service.install_from_upload(bytes, Some("theme.zip")).await;
            assert!(matches!(result, Err(ThemeInstallError::InvalidPackage(_))));
        }

        let oversized = [ZIP_LOCAL_HEADER, &vec![0u8; 1024 * 1024][..]].concat();
        assert!(matches!(
            service.install_from_upload(&oversized, None).await,
            Err(ThemeInstallError::InvalidPackage(_))
        ));

        assert_eq!(archive_count(&data_directory).await, 0);
        assert!(service.list_themes().await.expect("list").themes.is_empty());

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn remote_install_matches_uploading_the_same_archive() {
        let archive = theme_zip("Y-Theme");
        let catalog = MockCatalogRepository::new().with_theme("Y", "a.zip", archive.clone());
        let (remote_service, remote_dir) = setup_service(catalog, false).await;
        let (upload_service, upload_dir) =
            setup_service(MockCatalogRepository::new(), false).await;

        let remote_name = remote_service
            .install_from_remote("Y")
            .await
            .expect("install from remote");
        let upload_name = upload_service
            .install_from_upload(&archive, Some("a.zip"))
            .await
            .expect("install from upload");

        assert_eq!(remote_name, upload_name);

        let remote_list = remote_service.list_themes().await.expect("list remote");
        let upload_list = upload_service.list_themes().await.expect("list upload");
        assert_eq!(names(&remote_list), names(&upload_list));

        let relative = Path::new("Y-Theme").join("views").join("layout.html");
        let remote_file = tokio_fs::read(remote_dir.themes().join(&relative))
            .await
            .expect("read remote install");
        let upload_file = tokio_fs::read(upload_dir.themes().join(&relative))
            .await
            .expect("read uploaded install");
        assert_eq!(remote_file, upload_file);
        assert_eq!(archive_count(&remote_dir).await, 0);

        let _ = tokio_fs::remove_dir_all(remote_dir.root()).await;
        let _ = tokio_fs::remove_dir_all(upload_dir.root()).await;
    }

    #[tokio::test]
    async fn remote_failures_surface_as_fetch_errors() {
        let catalog = MockCatalogRepository::new();
        let (service, data_directory) = setup_service(catalog, false).await;

        let result = service.install_from_remote("missing").await;
        assert!(matches!(result, Err(ThemeInstallError::RemoteFetchFailed(_))));

        let result = service.install_from_remote("../escape").await;
        assert!(matches!(result, Err(ThemeInstallError::InvalidPackage(_))));

        assert!(service.list_themes().await.expect("list").themes.is_empty());
        assert_eq!(archive_count(&data_directory).await, 0);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn remote_archive_without_manifest_is_rejected() {
        let catalog = MockCatalogRepository::new().with_theme(
            "bare",
            "bare.zip",
            crate::test_support::build_zip(&[("index.html", "<html/>")]),
        );
        let (service, data_directory) = setup_service(catalog, false).await;

        let result = service.install_from_remote("bare").await;

        assert!(matches!(result, Err(ThemeInstallError::ManifestMissing)));
        assert_eq!(archive_count(&data_directory).await, 0);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn remote_install_of_listed_installed_theme_skips_download() {
        let mut catalog = MockCatalogRepository::new();
        catalog.descriptors.insert(
            "aurora".to_string(),
            CatalogDescriptor {
                archive: "missing.zip".to_string(),
                name: Some("Aurora".to_string()),
                sha256: None,
            },
        );
        let (service, data_directory) = setup_service(catalog, false).await;
        service
            .install_from_upload(&theme_zip("Aurora"), None)
            .await
            .expect("install from upload");

        let result = service.install_from_remote("aurora").await;

        assert!(matches!(result, Err(ThemeInstallError::AlreadyExists(name)) if name == "Aurora"));
        assert_eq!(archive_count(&data_directory).await, 0);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn listing_reports_current_theme() {
        let (service, data_directory) = setup_service(MockCatalogRepository::new(), false).await;
        for name in ["Alpha", "Beta"] {
            service
                .install_from_upload(&theme_zip(name), None)
                .await
                .expect("install theme");
        }

        let list = service.list_themes().await.expect("list themes");
        assert!(list.current.is_none());

        service
            .set_active_theme("Beta")
            .await
            .expect("set active theme");

        let list = service.list_themes().await.expect("list themes");
        assert_eq!(
            list.current.as_ref().map(|theme| theme.name.as_str()),
            Some("Beta")
        );
        assert_eq!(names(&list), vec!["Alpha"]);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[test]
    fn remote_archive_names_are_unique_per_attempt() {
        let first = remote_archive_name("aurora");
        let second = remote_archive_name("aurora");

        assert_ne!(first, second);
        assert!(first.starts_with("aurora_"));
        assert!(first.ends_with(".zip"));
    }

    #[tokio::test]
    async fn concurrent_remote_installs_of_one_identifier_keep_separate_archives() {
        let catalog = MockCatalogRepository::new().with_theme("race", "race.zip", theme_zip("Race"));
        let (service, data_directory) = setup_service(catalog, false).await;
        let service = Arc::new(service);

        let left = {
            let service = service.clone();
            tokio::spawn(async move { service.install_from_remote("race").await })
        };
        let right = {
            let service = service.clone();
            tokio::spawn(async move { service.install_from_remote("race").await })
        };
        let results = [
            left.await.expect("join left"),
            right.await.expect("join right"),
        ];

        assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|result| matches!(result, Err(ThemeInstallError::AlreadyExists(_)))));
        assert_eq!(archive_count(&data_directory).await, 0);

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn removing_unknown_theme_is_not_found() {
        let (service, data_directory) = setup_service(MockCatalogRepository::new(), false).await;

        assert!(matches!(
            service.remove_theme("nonexistent").await,
            Err(ThemeRemoveError::NotFound(_))
        ));

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }

    #[tokio::test]
    async fn zero_screenshot_bounds_are_rejected() {
        let (service, data_directory) = setup_service(MockCatalogRepository::new(), false).await;
        service
            .install_from_upload(&theme_zip("Shot"), None)
            .await
            .expect("install theme");

        assert!(matches!(
            service.screenshot("Shot", Some(0), None).await,
            Err(ApplicationError::ValidationError(_))
        ));
        assert!(service
            .screenshot("Shot", None, None)
            .await
            .expect("read screenshot")
            .is_none());
        assert!(matches!(
            service.screenshot("ghost", None, None).await,
            Err(ApplicationError::NotFound(_))
        ));

        let _ = tokio_fs::remove_dir_all(data_directory.root()).await;
    }
}
