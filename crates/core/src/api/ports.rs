//! Port interfaces for the Nexus sub-clients

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_domain::{CatalogItem, ExportParameters, Job, JobStatus, RefreshTokenRequest, Result, TokenPair};
use uuid::Uuid;

use super::stream::ByteStream;

/// Export progress callback: `(fraction, phase)` where phase is one of
/// `export`, `download` or `extract`.
pub type ExportProgress = dyn Fn(f64, &str) + Send + Sync;

/// Load progress callback: cumulative fraction of loaded resources.
pub type LoadProgress = dyn Fn(f64) + Send + Sync;

/// User endpoints
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Redeem a refresh token for a new token pair
    async fn refresh_token(&self, request: &RefreshTokenRequest) -> Result<TokenPair>;
}

/// Job endpoints
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Submit an export job
    async fn export(&self, parameters: &ExportParameters) -> Result<Job>;

    /// Fetch the current status of a job
    async fn get_job_status(&self, job_id: Uuid) -> Result<JobStatus>;
}

/// Artifact endpoints
#[async_trait]
pub trait ArtifactsApi: Send + Sync {
    /// Open the artifact body without buffering it
    async fn download(&self, artifact_id: &str) -> Result<ByteStream>;
}

/// Catalog endpoints
#[async_trait]
pub trait CatalogsApi: Send + Sync {
    /// Resolve catalog items for the given resource paths in one round trip
    async fn search_catalog_items(
        &self,
        resource_paths: &[String],
    ) -> Result<HashMap<String, CatalogItem>>;
}

/// Data endpoints
#[async_trait]
pub trait DataApi: Send + Sync {
    /// Open the raw float64 stream of a resource for `[begin, end)`
    async fn get_stream(
        &self,
        resource_path: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ByteStream>;
}
