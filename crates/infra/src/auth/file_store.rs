//! File token store
//!
//! One file per sign-in under `<home>/.nexus-api/tokens/`, named after the
//! cache key and holding the raw refresh token. Existing caches written by
//! other Nexus clients use the same layout and are picked up as is.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nexus_core::TokenStore;
use nexus_domain::constants::{TOKEN_CACHE_FILE_EXTENSION, TOKEN_CACHE_FOLDER, TOKEN_CACHE_SUBFOLDER};
use nexus_domain::{ApiError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::to_api_error;

/// Token store backed by one file per cache key.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    root: PathBuf,
}

impl FileTokenStore {
    /// Store rooted at `root`; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `<home>/.nexus-api/tokens`.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] when the home directory cannot be
    /// determined.
    pub fn in_home_dir() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ApiError::Config("cannot determine the home directory".into()))?;
        Ok(Self::new(home.join(TOKEN_CACHE_FOLDER).join(TOKEN_CACHE_SUBFOLDER)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{TOKEN_CACHE_FILE_EXTENSION}"))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);

        match fs::read_to_string(&path).await {
            Ok(token) => {
                debug!(path = %path.display(), "Loaded cached refresh token");
                Ok(Some(token))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(to_api_error(err)),
        }
    }

    /// Sets file permissions to 0600 (owner read/write only) on Unix.
    async fn save(&self, key: &str, refresh_token: &str) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(to_api_error)?;

        let path = self.path_for(key);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&path).await.map_err(to_api_error)?;

        // Files written before the mode was set keep their old permissions.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            file.set_permissions(permissions).await.map_err(to_api_error)?;
        }

        file.write_all(refresh_token.as_bytes()).await.map_err(to_api_error)?;
        file.flush().await.map_err(to_api_error)?;

        debug!(path = %path.display(), "Stored refresh token");
        Ok(())
    }
}
