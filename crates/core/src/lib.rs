//! # Nexus Core
//!
//! Client logic that does not touch the network or the file system.
//!
//! This crate contains:
//! - Sub-client port interfaces (traits) and the unconsumed body type
//! - The token manager and the token store port
//! - Decoding of raw float64 payloads
//!
//! ## Architecture Principles
//! - Only depends on `nexus-domain`
//! - No HTTP or file system code
//! - All external dependencies via traits

pub mod api;
pub mod auth;
pub mod data;

pub use api::{
    ArtifactsApi, ByteStream, CatalogsApi, DataApi, ExportProgress, JobsApi, LoadProgress,
    UsersApi,
};
pub use auth::{token_cache_key, MemoryTokenStore, TokenManager, TokenStore};
pub use data::decode_f64_payload;
