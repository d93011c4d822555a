//! Wire and result types of the Nexus API

pub mod auth;
pub mod catalog;
pub mod data;
pub mod jobs;

pub use auth::{RefreshTokenRequest, TokenPair};
pub use catalog::{CatalogItem, Representation, Resource};
pub use data::DataResponse;
pub use jobs::{ExportParameters, Job, JobStatus, TaskStatus};
