//! Refresh-token persistence on disk

pub mod file_store;

pub use file_store::FileTokenStore;
