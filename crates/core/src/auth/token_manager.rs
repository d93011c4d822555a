//! Token manager with refresh-token rotation
//!
//! Owns the live access/refresh token pair of one client:
//! - Sign-in resolves the (possibly rotated) refresh token from the token store
//! - Refresh runs inside a client-scoped critical section
//! - The outgoing `Authorization` header is derived from the held pair
//!
//! The manager never talks to the network itself. Callers pass a `redeem`
//! closure that exchanges a refresh token for a new [`TokenPair`], which keeps
//! the refresh endpoint call (and its transport) on the infra side.

use std::future::Future;
use std::sync::Arc;

use nexus_domain::{Result, TokenPair};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::ports::TokenStore;

/// Cache key of a refresh token: uppercase hex SHA-256 of its UTF-8 bytes.
pub fn token_cache_key(refresh_token: &str) -> String {
    hex::encode_upper(Sha256::digest(refresh_token.as_bytes()))
}

#[derive(Debug, Default)]
struct AuthState {
    token_pair: Option<TokenPair>,
    authorization: Option<String>,
    cache_key: Option<String>,
}

/// Client-scoped authentication state
///
/// Reads (header, authentication check) take a short read lock; every
/// mutation of the pair happens while `refresh_lock` is held, except
/// [`sign_out`](Self::sign_out) which only clears.
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
    state: RwLock<AuthState>,
}

impl TokenManager {
    /// Create an unauthenticated token manager
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store, refresh_lock: Mutex::new(()), state: RwLock::new(AuthState::default()) }
    }

    /// `true` while a token pair is held
    pub fn is_authenticated(&self) -> bool {
        self.state.read().token_pair.is_some()
    }

    /// Current `Authorization` header value (`Bearer <access_token>`)
    pub fn authorization_header(&self) -> Option<String> {
        self.state.read().authorization.clone()
    }

    /// Refresh token of the held pair
    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().token_pair.as_ref().map(|pair| pair.refresh_token.clone())
    }

    /// Cache key of the current sign-in, if any
    pub fn cache_key(&self) -> Option<String> {
        self.state.read().cache_key.clone()
    }

    /// Sign in with a refresh token
    ///
    /// If the token store already has an entry for this token's cache key,
    /// the stored (rotated) token is redeemed instead; otherwise the supplied
    /// token becomes the initial entry. Any previous session is replaced.
    ///
    /// # Errors
    /// Returns the token store error or the error of `redeem`.
    #[instrument(skip_all)]
    pub async fn sign_in<F, Fut>(&self, refresh_token: &str, redeem: F) -> Result<()>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<TokenPair>> + Send,
    {
        let key = token_cache_key(refresh_token);

        let resolved = if let Some(stored) = self.store.load(&key).await? {
            debug!(cache_key = %key, "Using cached refresh token");
            stored
        } else {
            debug!(cache_key = %key, "No cached refresh token, storing initial entry");
            self.store.save(&key, refresh_token).await?;
            refresh_token.to_owned()
        };

        let _guard = self.refresh_lock.lock().await;
        *self.state.write() = AuthState { cache_key: Some(key), ..AuthState::default() };
        self.redeem_locked(&resolved, redeem).await?;

        info!("Signed in");
        Ok(())
    }

    /// Refresh the token pair
    ///
    /// Runs inside the client-scoped critical section. When a pair is held
    /// and its refresh token differs from `presented`, a concurrent caller
    /// already rotated it and this call returns without redeeming.
    ///
    /// # Errors
    /// Returns the error of `redeem` or of persisting the rotated token. The
    /// held pair is left untouched on failure.
    #[instrument(skip_all)]
    pub async fn refresh<F, Fut>(&self, presented: &str, redeem: F) -> Result<()>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<TokenPair>> + Send,
    {
        let _guard = self.refresh_lock.lock().await;

        if self.refresh_token().is_some_and(|current| current != presented) {
            debug!("Refresh token already rotated, skipping refresh");
            return Ok(());
        }

        self.redeem_locked(presented, redeem).await?;

        info!("Access token refreshed");
        Ok(())
    }

    /// Clear the held pair and the `Authorization` header. Idempotent.
    pub fn sign_out(&self) {
        let mut state = self.state.write();
        if state.token_pair.is_some() {
            info!("Signed out");
        }
        *state = AuthState::default();
    }

    // Caller holds `refresh_lock`.
    async fn redeem_locked<F, Fut>(&self, presented: &str, redeem: F) -> Result<()>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<TokenPair>> + Send,
    {
        let pair = redeem(presented.to_owned()).await?;

        let cache_key = self.cache_key();
        if let Some(key) = cache_key {
            self.store.save(&key, &pair.refresh_token).await?;
        }

        let mut state = self.state.write();
        state.authorization = Some(pair.bearer());
        state.token_pair = Some(pair);
        Ok(())
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("authenticated", &self.is_authenticated())
            .field("cache_key", &self.cache_key())
            .finish_non_exhaustive()
    }
}
