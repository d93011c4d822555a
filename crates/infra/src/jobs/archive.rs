//! Zip extraction

use std::path::{Path, PathBuf};

use nexus_domain::{ApiError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};
use zip::ZipArchive;

use crate::errors::to_api_error;

/// Extract the zip archive in `scratch` into `target_folder`, overwriting
/// existing files. The scratch file is deleted afterwards, also on failure.
///
/// Runs on the blocking pool.
///
/// # Errors
/// - [`ApiError::Archive`] if the file is not a valid zip archive
/// - [`ApiError::Io`] if the target folder cannot be written
#[instrument(skip(scratch), fields(target = %target_folder.display()))]
pub async fn extract_archive(scratch: NamedTempFile, target_folder: &Path) -> Result<()> {
    let target: PathBuf = target_folder.to_path_buf();

    let entries = tokio::task::spawn_blocking(move || -> Result<usize> {
        let file = scratch.reopen().map_err(to_api_error)?;
        let mut archive = ZipArchive::new(file).map_err(to_api_error)?;
        std::fs::create_dir_all(&target).map_err(to_api_error)?;
        archive.extract(&target).map_err(to_api_error)?;
        Ok(archive.len())
    })
    .await
    .map_err(|err| ApiError::Io(format!("archive extraction task failed: {err}")))??;

    debug!(entries, "Archive extracted");
    Ok(())
}
