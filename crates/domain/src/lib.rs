//! # Nexus Domain
//!
//! Wire types, errors and configuration shared by the Nexus client crates.
//!
//! ## Architecture
//! - No dependencies on other Nexus crates
//! - Only serialization and error-handling dependencies
//! - Pure data structures; no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
