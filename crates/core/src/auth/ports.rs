//! Port interface for refresh-token persistence

use async_trait::async_trait;
use nexus_domain::Result;

/// Persists the latest refresh token of a sign-in.
///
/// Entries are keyed by [`token_cache_key`](super::token_cache_key) of the
/// token the user originally signed in with, so a restarted process finds the
/// rotated token under the same key.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored token for `key`, `None` when no entry exists
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite the entry for `key`
    async fn save(&self, key: &str, refresh_token: &str) -> Result<()>;
}
