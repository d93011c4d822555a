//! In-memory token store

use std::collections::HashMap;

use async_trait::async_trait;
use nexus_domain::Result;
use parking_lot::Mutex;

use super::ports::TokenStore;

/// Token store that keeps entries for the lifetime of the process.
///
/// Used by tests and by clients that must not touch the file system.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry for `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, refresh_token: &str) -> Result<()> {
        self.entries.lock().insert(key.to_owned(), refresh_token.to_owned());
        Ok(())
    }
}
