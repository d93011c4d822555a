//! Export jobs: poll, download and extract

pub mod archive;
pub mod download;
pub mod export;

pub use archive::extract_archive;
pub use download::download_to_file;
pub use export::JobOrchestrator;

use nexus_core::ExportProgress;

pub(crate) fn report(on_progress: Option<&ExportProgress>, progress: f64, phase: &str) {
    if let Some(callback) = on_progress {
        callback(progress, phase);
    }
}
