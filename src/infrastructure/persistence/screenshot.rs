use image::imageops::FilterType;
use image::ImageFormat;
use mime_guess::from_path;
use std::io::Cursor;
use std::path::Path;
use tokio::fs;

use crate::domain::errors::DomainError;
use crate::domain::models::theme::{ScreenshotAsset, ScreenshotSize};

pub const SCREENSHOT_FILE_NAME: &str = "screenshot.png";

/// Largest edge a resized screenshot may request.
pub const MAX_SCREENSHOT_EDGE: u32 = 2048;

/// Read a screenshot from disk, resizing it when bounds are requested.
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_screenshot(
    path: &Path,
    size: Option<ScreenshotSize>,
) -> Result<Option<ScreenshotAsset>, DomainError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(DomainError::InternalError(format!(
                "Failed to read screenshot '{}': {}",
                path.display(),
                error
            )));
        }
    };

    let Some(size) = size else {
        let mime_type = from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        return Ok(Some(ScreenshotAsset { bytes, mime_type }));
    };

    let display_path = path.display().to_string();
    let resized = tokio::task::spawn_blocking(move || resize_png(&bytes, size))
        .await
        .map_err(|error| {
            DomainError::InternalError(format!("Screenshot resize task failed: {}", error))
        })?
        .map_err(|error| {
            DomainError::InternalError(format!(
                "Failed to resize screenshot '{}': {}",
                display_path, error
            ))
        })?;

    Ok(Some(ScreenshotAsset {
        bytes: resized,
        mime_type: "image/png".to_string(),
    }))
}

fn resize_png(source_bytes: &[u8], size: ScreenshotSize) -> Result<Vec<u8>, image::ImageError> {
    let source_image = image::load_from_memory(source_bytes)?;

    let width = size.width.clamp(1, MAX_SCREENSHOT_EDGE);
    let height = size.height.clamp(1, MAX_SCREENSHOT_EDGE);
    let resized = source_image.resize(width, height, FilterType::Triangle);

    let mut encoded = Vec::new();
    resized.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::unique_temp_root;
    use image::{DynamicImage, RgbaImage};

    fn build_png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut output = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
            .expect("should build png image");
        output
    }

    #[tokio::test]
    async fn missing_screenshot_is_none() {
        let root = unique_temp_root("screenshot-missing");
        let result = read_screenshot(&root.join(SCREENSHOT_FILE_NAME), None)
            .await
            .expect("read screenshot");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn original_screenshot_is_served_as_is() {
        let root = unique_temp_root("screenshot-original");
        fs::create_dir_all(&root).await.expect("create root");
        let path = root.join(SCREENSHOT_FILE_NAME);
        let png = build_png(8, 4);
        fs::write(&path, &png).await.expect("write png");

        let asset = read_screenshot(&path, None)
            .await
            .expect("read screenshot")
            .expect("screenshot exists");

        assert_eq!(asset.bytes, png);
        assert_eq!(asset.mime_type, "image/png");
        let _ = fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn resized_screenshot_keeps_aspect_ratio() {
        let root = unique_temp_root("screenshot-resized");
        fs::create_dir_all(&root).await.expect("create root");
        let path = root.join(SCREENSHOT_FILE_NAME);
        fs::write(&path, build_png(200, 100)).await.expect("write png");

        let asset = read_screenshot(
            &path,
            Some(ScreenshotSize {
                width: 50,
                height: 50,
            }),
        )
        .await
        .expect("read screenshot")
        .expect("screenshot exists");

        let decoded = image::load_from_memory(&asset.bytes).expect("decode resized");
        assert_eq!((decoded.width(), decoded.height()), (50, 25));
        let _ = fs::remove_dir_all(root).await;
    }
}
