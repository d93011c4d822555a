//! # Nexus Infrastructure
//!
//! Infrastructure implementations of the `nexus-core` ports.
//!
//! This crate contains:
//! - The HTTP transport and the [`NexusClient`] request invoker
//! - Sub-clients for users, jobs, artifacts, catalogs and data
//! - The file-backed refresh token store
//! - Export orchestration (poll, download, extract) and batch loading
//! - Configuration loading and a blocking facade
//!
//! ## Architecture
//! - Implements traits defined in `nexus-core`
//! - Depends on `nexus-domain` and `nexus-core`
//! - Contains all "impure" code (network, file system)

pub mod api;
pub mod auth;
pub mod blocking;
pub mod config;
pub mod data;
pub mod errors;
pub mod http;
pub mod jobs;
pub mod observability;

// Re-export commonly used items
pub use api::{
    ApiRequest, ConfigurationGuard, DecodeAs, NexusClient, NexusClientBuilder, RawTransport,
    ResultKind, Unit,
};
pub use auth::FileTokenStore;
pub use blocking::BlockingClient;
pub use data::BatchLoader;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use jobs::JobOrchestrator;
pub use observability::{error_label, ClientMetrics, MetricsSnapshot};
