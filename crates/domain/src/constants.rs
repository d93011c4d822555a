//! Client constants
//!
//! Centralized location for wire-level constants shared by the client crates.

// Error codes
pub const ERROR_CODE_PREFIX: &str = "N";

// Headers
pub const AUTHORIZATION_HEADER_KEY: &str = "Authorization";
pub const CONFIGURATION_HEADER_KEY: &str = "Nexus-Configuration";
/// Substring of the `WWW-Authenticate` challenge that marks an expired access
/// token. Any other 401 is treated as a hard rejection.
pub const TOKEN_EXPIRED_MARKER: &str = "The token expired at";

// Token cache
pub const TOKEN_CACHE_FOLDER: &str = ".nexus-api";
pub const TOKEN_CACHE_SUBFOLDER: &str = "tokens";
pub const TOKEN_CACHE_FILE_EXTENSION: &str = "json";

// Transport defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_JOB_POLL_INTERVAL_MS: u64 = 1_000;

// Progress labels passed to export callbacks
pub const PROGRESS_EXPORT: &str = "export";
pub const PROGRESS_DOWNLOAD: &str = "download";
pub const PROGRESS_EXTRACT: &str = "extract";

// Catalog resource properties surfaced by `load`
pub const PROPERTY_UNIT: &str = "unit";
pub const PROPERTY_DESCRIPTION: &str = "description";

// API routes (v1), relative to the base URL
pub const ROUTE_REFRESH_TOKEN: &str = "api/v1/users/tokens/refresh";
pub const ROUTE_EXPORT: &str = "api/v1/jobs/export";
pub const ROUTE_JOBS: &str = "api/v1/jobs";
pub const ROUTE_ARTIFACTS: &str = "api/v1/artifacts";
pub const ROUTE_SEARCH_CATALOG_ITEMS: &str = "api/v1/catalogs/search-items";
pub const ROUTE_DATA: &str = "api/v1/data";
