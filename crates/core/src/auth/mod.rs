//! Authentication state and refresh-token persistence

pub mod memory_store;
pub mod ports;
pub mod token_manager;

pub use memory_store::MemoryTokenStore;
pub use ports::TokenStore;
pub use token_manager::{token_cache_key, TokenManager};
