//! Nexus API client
//!
//! - [`NexusClient`]: invoker, authentication and configuration header
//! - Sub-clients implementing the `nexus-core` ports
//! - [`ResultKind`] markers selecting how a response is completed

pub mod client;
pub mod configuration;
pub mod request;
pub mod resources;
mod stream;

pub use client::{NexusClient, NexusClientBuilder};
pub use configuration::ConfigurationGuard;
pub use request::{ApiRequest, DecodeAs, RawTransport, ResultKind, Unit};
pub use resources::{ArtifactsClient, CatalogsClient, DataClient, JobsClient, UsersClient};
