use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

use crate::domain::errors::ThemeInstallError;
use crate::domain::models::theme::ThemeManifest;

const MAX_ARCHIVE_ENTRIES: usize = 50_000;
const MAX_TOTAL_UNCOMPRESSED_BYTES: u64 = 2 * 1024 * 1024 * 1024;
const MAX_ENTRY_UNCOMPRESSED_BYTES: u64 = 512 * 1024 * 1024;
const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;
const MAX_COMPRESSION_RATIO: u64 = 500;
const COMPRESSION_RATIO_MIN_BYTES: u64 = 1024 * 1024;
const FILE_IO_BUFFER_BYTES: usize = 256 * 1024;

const UNIX_FILE_TYPE_MASK: u32 = 0o170000;
const UNIX_SYMLINK: u32 = 0o120000;

#[derive(Debug, Clone)]
pub struct PackageManifest {
    pub manifest: ThemeManifest,
    /// Folder wrapping the package contents; empty when the manifest sits
    /// at the archive root
    pub root_prefix: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Read the manifest of a theme package without extracting anything else.
///
/// The manifest is looked up at the archive root first. Packages that wrap
/// everything in a single top-level folder are accepted when the manifest
/// sits directly inside that folder.
pub fn read_package_manifest(
    archive_path: &Path,
    manifest_file: &str,
) -> Result<PackageManifest, ThemeInstallError> {
    let mut archive = open_archive(archive_path)?;

    let Some((index, root_prefix)) = locate_manifest(&mut archive, manifest_file)? else {
        return Err(ThemeInstallError::ManifestMissing);
    };

    let entry = archive
        .by_index(index)
        .map_err(|error| invalid_package("Failed to read manifest entry", error))?;

    if entry.size() > MAX_MANIFEST_BYTES {
        return Err(ThemeInstallError::InvalidManifest(format!(
            "Manifest is larger than {} bytes",
            MAX_MANIFEST_BYTES
        )));
    }

    let mut bytes = Vec::new();
    entry
        .take(MAX_MANIFEST_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|error| invalid_package("Failed to read manifest entry", error))?;

    let manifest = ThemeManifest::from_slice(&bytes).map_err(ThemeInstallError::InvalidManifest)?;

    Ok(PackageManifest {
        manifest,
        root_prefix,
    })
}

/// Extract every entry below `root_prefix` into `destination`.
///
/// Entries escaping the destination fail the whole extraction; the caller
/// owns cleanup of `destination`.
pub fn extract_package(
    archive_path: &Path,
    root_prefix: &Path,
    destination: &Path,
) -> Result<ExtractSummary, ThemeInstallError> {
    let mut archive = open_archive(archive_path)?;
    let mut summary = ExtractSummary::default();
    let mut total_uncompressed_bytes = 0u64;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|error| extract_error("Failed to read archive entry", error))?;

        let raw_name = entry.name().to_string();
        let sanitized_path = sanitize_zip_entry_path(&raw_name)?;
        if sanitized_path.as_os_str().is_empty() {
            continue;
        }

        let Ok(relative_path) = sanitized_path.strip_prefix(root_prefix) else {
            continue;
        };
        if relative_path.as_os_str().is_empty() {
            continue;
        }

        if entry
            .unix_mode()
            .is_some_and(|mode| mode & UNIX_FILE_TYPE_MASK == UNIX_SYMLINK)
        {
            tracing::warn!("Skipping symlink entry in theme package: {}", raw_name);
            continue;
        }

        let output_path = destination.join(relative_path);

        if entry.is_dir() || raw_name.ends_with('/') {
            fs::create_dir_all(&output_path)
                .map_err(|error| extract_error("Failed to create directory", error))?;
            continue;
        }

        validate_zip_entry_limits(
            &raw_name,
            entry.size(),
            entry.compressed_size(),
            &mut total_uncompressed_bytes,
        )?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| extract_error("Failed to create parent directory", error))?;
        }

        let output_file = File::create(&output_path)
            .map_err(|error| extract_error("Failed to create file", error))?;
        let mut writer = BufWriter::with_capacity(FILE_IO_BUFFER_BYTES, output_file);

        let written = io::copy(
            &mut (&mut entry).take(MAX_ENTRY_UNCOMPRESSED_BYTES + 1),
            &mut writer,
        )
        .map_err(|error| extract_error("Failed to write file", error))?;

        if written > MAX_ENTRY_UNCOMPRESSED_BYTES {
            return Err(ThemeInstallError::ExtractFailed(format!(
                "Archive entry is too large (>{} bytes): {}",
                MAX_ENTRY_UNCOMPRESSED_BYTES, raw_name
            )));
        }

        writer
            .flush()
            .map_err(|error| extract_error("Failed to write file", error))?;

        summary.files += 1;
        summary.bytes = summary.bytes.saturating_add(written);
    }

    Ok(summary)
}

fn open_archive(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>, ThemeInstallError> {
    let archive_file = File::open(archive_path)
        .map_err(|error| invalid_package("Failed to open archive file", error))?;
    let archive = ZipArchive::new(BufReader::with_capacity(FILE_IO_BUFFER_BYTES, archive_file))
        .map_err(|error| invalid_package("Failed to parse archive file", error))?;

    if archive.len() > MAX_ARCHIVE_ENTRIES {
        return Err(ThemeInstallError::InvalidPackage(format!(
            "Archive has more than {} entries",
            MAX_ARCHIVE_ENTRIES
        )));
    }

    Ok(archive)
}

fn locate_manifest<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    manifest_file: &str,
) -> Result<Option<(usize, PathBuf)>, ThemeInstallError> {
    let mut top_level = BTreeSet::new();
    let mut nested = Vec::new();

    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|error| invalid_package("Failed to read archive entry", error))?;
        let is_dir = entry.is_dir();

        // Unsafe paths are reported by extraction; they never hold the manifest
        let Ok(path) = sanitize_zip_entry_path(entry.name()) else {
            continue;
        };

        let components = path_components(&path);
        let Some(first) = components.first() else {
            continue;
        };
        top_level.insert(first.clone());

        if is_dir {
            continue;
        }

        match components.as_slice() {
            [name] if name == manifest_file => return Ok(Some((index, PathBuf::new()))),
            [folder, name] if name == manifest_file => {
                nested.push((index, PathBuf::from(folder)));
            }
            _ => {}
        }
    }

    if top_level.len() != 1 {
        return Ok(None);
    }

    Ok(nested.into_iter().next())
}

fn validate_zip_entry_limits(
    entry_name: &str,
    uncompressed_size: u64,
    compressed_size: u64,
    total_uncompressed_bytes: &mut u64,
) -> Result<(), ThemeInstallError> {
    if uncompressed_size > MAX_ENTRY_UNCOMPRESSED_BYTES {
        return Err(ThemeInstallError::ExtractFailed(format!(
            "Archive entry is too large (>{} bytes): {}",
            MAX_ENTRY_UNCOMPRESSED_BYTES, entry_name
        )));
    }

    if compressed_size > 0
        && uncompressed_size > COMPRESSION_RATIO_MIN_BYTES
        && uncompressed_size / compressed_size > MAX_COMPRESSION_RATIO
    {
        return Err(ThemeInstallError::ExtractFailed(format!(
            "Archive entry compression ratio is suspicious: {}",
            entry_name
        )));
    }

    *total_uncompressed_bytes = total_uncompressed_bytes.saturating_add(uncompressed_size);
    if *total_uncompressed_bytes > MAX_TOTAL_UNCOMPRESSED_BYTES {
        return Err(ThemeInstallError::ExtractFailed(format!(
            "Archive uncompressed size exceeds limit (>{} bytes)",
            MAX_TOTAL_UNCOMPRESSED_BYTES
        )));
    }

    Ok(())
}

fn sanitize_zip_entry_path(raw_path: &str) -> Result<PathBuf, ThemeInstallError> {
    let mut sanitized = PathBuf::new();

    for component in Path::new(raw_path).components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ThemeInstallError::ExtractFailed(format!(
                    "Invalid archive entry path: {}",
                    raw_path
                )));
            }
        }
    }

    Ok(sanitized)
}

fn path_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

fn invalid_package(context: &str, error: impl std::fmt::Display) -> ThemeInstallError {
    ThemeInstallError::InvalidPackage(format!("{}: {}", context, error))
}

fn extract_error(context: &str, error: impl std::fmt::Display) -> ThemeInstallError {
    ThemeInstallError::ExtractFailed(format!("{}: {}", context, error))
}
