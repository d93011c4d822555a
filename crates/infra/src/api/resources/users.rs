use std::sync::Arc;

use async_trait::async_trait;
use nexus_core::UsersApi;
use nexus_domain::{RefreshTokenRequest, Result, TokenPair};

use crate::api::client::ClientCore;

/// User endpoints
#[derive(Clone)]
pub struct UsersClient {
    core: Arc<ClientCore>,
}

impl UsersClient {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl UsersApi for UsersClient {
    /// Does not take part in the refresh policy: a rejected refresh token is
    /// reported as is.
    async fn refresh_token(&self, request: &RefreshTokenRequest) -> Result<TokenPair> {
        self.core.redeem(request.refresh_token.clone()).await
    }
}
