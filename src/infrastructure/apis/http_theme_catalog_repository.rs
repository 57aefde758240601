use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs as tokio_fs;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::domain::errors::CatalogError;
use crate::domain::models::catalog::{CatalogDescriptor, CatalogPage};
use crate::domain::repositories::theme_catalog_repository::ThemeCatalogRepository;
use crate::infrastructure::logging::logger;

/// Catalog client speaking the `<base>/theme` JSON API
pub struct HttpThemeCatalogRepository {
    client: Client,
    base_url: Option<Url>,
    max_archive_bytes: u64,
}

impl HttpThemeCatalogRepository {
    /// `base_url` of `None` leaves the catalog disabled; every call then
    /// fails with [`CatalogError::NotConfigured`]
    pub fn new(
        client: Client,
        base_url: Option<&str>,
        max_archive_bytes: u64,
    ) -> Result<Self, CatalogError> {
        let base_url = base_url.map(parse_base_url).transpose()?;

        Ok(Self {
            client,
            base_url,
            max_archive_bytes,
        })
    }

    fn base_url(&self) -> Result<&Url, CatalogError> {
        self.base_url.as_ref().ok_or(CatalogError::NotConfigured)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url()?
            .join(path)
            .map_err(|e| CatalogError::Request(format!("Invalid catalog URL {}: {}", path, e)))
    }

    /// Resolve an archive location against the catalog base
    fn archive_url(&self, archive: &str) -> Result<Url, CatalogError> {
        match Url::parse(archive) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
            Ok(url) => Err(CatalogError::Decode(format!(
                "Unsupported archive URL scheme: {}",
                url.scheme()
            ))),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.endpoint(archive.trim_start_matches('/'))
            }
            Err(e) => Err(CatalogError::Decode(format!(
                "Invalid archive URL {}: {}",
                archive, e
            ))),
        }
    }

    async fn send(&self, url: Url, query: &[(String, String)]) -> Result<Response, CatalogError> {
        logger::debug(&format!("Catalog request: {}", url));

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                logger::error(&format!("Catalog request to {} failed: {}", url, e));
                CatalogError::Request(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> Result<T, CatalogError> {
        let response = self.send(url, query).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Request(format!("Failed to read response body: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| {
            logger::error(&format!("Failed to parse catalog response: {}", e));
            CatalogError::Decode(e.to_string())
        })
    }

    async fn stream_to_file(
        &self,
        response: Response,
        destination: &Path,
        expected_sha256: Option<&str>,
    ) -> Result<u64, CatalogError> {
        if let Some(parent) = destination.parent() {
            tokio_fs::create_dir_all(parent)
                .await
                .map_err(|e| CatalogError::Io(format!("Failed to create directory: {}", e)))?;
        }

        let mut file = tokio_fs::File::create(destination)
            .await
            .map_err(|e| CatalogError::Io(format!("Failed to create file: {}", e)))?;

        let mut hasher = Sha256::new();
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| CatalogError::Request(format!("Failed to download archive: {}", e)))?;

            written = written.saturating_add(chunk.len() as u64);
            if written > self.max_archive_bytes {
                return Err(CatalogError::ArchiveTooLarge {
                    limit: self.max_archive_bytes,
                });
            }

            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| CatalogError::Io(format!("Failed to write file: {}", e)))?;
        }

        file.flush()
            .await
            .map_err(|e| CatalogError::Io(format!("Failed to write file: {}", e)))?;

        if let Some(expected) = expected_sha256 {
            let actual = format!("{:x}", hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(CatalogError::ChecksumMismatch {
                    expected: expected.trim().to_string(),
                    actual,
                });
            }
        }

        Ok(written)
    }
}

#[async_trait]
impl ThemeCatalogRepository for HttpThemeCatalogRepository {
    async fn fetch_descriptor(&self, identifier: &str) -> Result<CatalogDescriptor, CatalogError> {
        tracing::info!("Fetching catalog descriptor for theme {}", identifier);

        let mut url = self.endpoint("theme")?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Request("Catalog URL cannot be a base".to_string()))?
            .push(identifier);

        self.get_json(url, &[]).await
    }

    async fn download_archive(
        &self,
        descriptor: &CatalogDescriptor,
        destination: &Path,
    ) -> Result<u64, CatalogError> {
        let url = self.archive_url(&descriptor.archive)?;
        tracing::info!("Downloading theme archive from {} to {:?}", url, destination);

        let response = self.send(url, &[]).await?;

        if let Some(length) = response.content_length() {
            if length > self.max_archive_bytes {
                return Err(CatalogError::ArchiveTooLarge {
                    limit: self.max_archive_bytes,
                });
            }
        }

        let result = self
            .stream_to_file(response, destination, descriptor.sha256.as_deref())
            .await;

        if result.is_err() {
            if let Err(error) = tokio_fs::remove_file(destination).await {
                if error.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove partial download {:?}: {}", destination, error);
                }
            }
        }

        result
    }

    async fn search(&self, query: &[(String, String)]) -> Result<CatalogPage, CatalogError> {
        let url = self.endpoint("theme")?;
        self.get_json(url, query).await
    }
}

/// Parse the catalog base, forcing a trailing slash so relative joins
/// append to the path instead of replacing its last segment
fn parse_base_url(raw: &str) -> Result<Url, CatalogError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| CatalogError::Request(format!("Invalid catalog URL {}: {}", raw, e)))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
