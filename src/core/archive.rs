use crate::core::fsops::{self, ExcludeSet};
use crate::utils::error::{Result, SysKitError};
use std::fs;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Zip a file or a directory tree into `destination`. Directory entries are
/// stored with `/`-separated paths relative to the source root. Returns the
/// number of entries written.
pub fn zip_path(source: &Path, destination: &Path, exclude: &ExcludeSet) -> Result<u64> {
    if !source.exists() {
        return Err(SysKitError::InvalidPathError {
            path: source.display().to_string(),
            reason: "source does not exist".to_string(),
        });
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(destination)?;
    let mut zip = ZipWriter::new(file);
    let mut entries = 0;

    if source.is_dir() {
        for path in fsops::walk_files(source) {
            if exclude.matches(&path) {
                continue;
            }
            let relative = path.strip_prefix(source).unwrap_or(path.as_path());
            let name: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            zip.start_file::<_, ()>(name.join("/"), FileOptions::default())?;
            let mut input = fs::File::open(&path)?;
            std::io::copy(&mut input, &mut zip)?;
            entries += 1;
        }
    } else if !exclude.matches(source) {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SysKitError::InvalidPathError {
                path: source.display().to_string(),
                reason: "source has no file name".to_string(),
            })?;
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        let mut input = fs::File::open(source)?;
        std::io::copy(&mut input, &mut zip)?;
        entries += 1;
    }

    zip.finish()?;
    tracing::debug!("Wrote {} entries to {}", entries, destination.display());
    Ok(entries)
}

/// Extract an archive into `destination` (created if absent). Returns the
/// number of entries in the archive.
pub fn unzip(archive_path: &Path, destination: &Path) -> Result<u64> {
    if !archive_path.exists() {
        return Err(SysKitError::InvalidPathError {
            path: archive_path.display().to_string(),
            reason: "archive not found".to_string(),
        });
    }
    fsops::ensure_directory(destination)?;

    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let entries = archive.len() as u64;
    archive.extract(destination)?;
    Ok(entries)
}

/// Backup then cleanup: zip the source and delete the original.
pub fn archive_and_clean(source: &Path, destination: &Path, exclude: &ExcludeSet) -> Result<u64> {
    let entries = zip_path(source, destination, exclude)?;
    fsops::delete_path(source)?;
    Ok(entries)
}
