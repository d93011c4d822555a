//! Artifact download into a scratch file

use nexus_core::{ByteStream, ExportProgress};
use nexus_domain::constants::PROGRESS_DOWNLOAD;
use nexus_domain::{ApiError, Result};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::report;
use crate::errors::to_api_error;

/// Stream `body` into a new scratch file.
///
/// While the body has a known length and is not fully consumed, each chunk
/// reports `(consumed / length, "download")`; after the stream ends
/// `(1, "download")` is reported exactly once. The scratch file is deleted
/// when the returned handle is dropped, including on every error path.
///
/// # Errors
/// - [`ApiError::Io`] if the scratch file cannot be written
/// - [`ApiError::Network`] if the body breaks off
/// - [`ApiError::Cancelled`] if `cancel` fires between chunks
#[instrument(skip_all, fields(content_length = ?body.content_length()))]
pub async fn download_to_file(
    mut body: ByteStream,
    on_progress: Option<&ExportProgress>,
    cancel: Option<&CancellationToken>,
) -> Result<NamedTempFile> {
    let scratch = NamedTempFile::new().map_err(to_api_error)?;
    let mut file = tokio::fs::File::from_std(scratch.reopen().map_err(to_api_error)?);

    let length = body.content_length().filter(|length| *length > 0);
    let mut consumed: u64 = 0;

    loop {
        let chunk = match cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => return Err(ApiError::Cancelled),
                chunk = body.next_chunk() => chunk,
            },
            None => body.next_chunk().await,
        };

        let Some(chunk) = chunk else { break };
        let chunk = chunk?;

        file.write_all(&chunk).await.map_err(to_api_error)?;
        consumed += chunk.len() as u64;

        if let Some(length) = length {
            if consumed < length {
                #[allow(clippy::cast_precision_loss)]
                report(on_progress, consumed as f64 / length as f64, PROGRESS_DOWNLOAD);
            }
        }
    }

    file.flush().await.map_err(to_api_error)?;
    debug!(bytes = consumed, "Artifact downloaded");
    report(on_progress, 1.0, PROGRESS_DOWNLOAD);

    Ok(scratch)
}
