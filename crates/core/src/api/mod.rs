//! Sub-client contracts
//!
//! The job orchestrator and the batch loader only see these traits; the
//! HTTP-backed implementations live in `nexus-infra`.

pub mod ports;
pub mod stream;

pub use ports::{ArtifactsApi, CatalogsApi, DataApi, ExportProgress, JobsApi, LoadProgress, UsersApi};
pub use stream::ByteStream;
