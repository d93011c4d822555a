//! Sub-clients backed by the invoker
//!
//! Each sub-client is a cheap handle on the shared client state and
//! implements the matching port from `nexus-core`.

mod artifacts;
mod catalogs;
mod data;
mod jobs;
mod users;

pub use artifacts::ArtifactsClient;
pub use catalogs::CatalogsClient;
pub use data::DataClient;
pub use jobs::JobsClient;
pub use users::UsersClient;
