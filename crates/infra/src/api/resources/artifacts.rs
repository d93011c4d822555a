use std::sync::Arc;

use async_trait::async_trait;
use nexus_core::{ArtifactsApi, ByteStream};
use nexus_domain::constants::ROUTE_ARTIFACTS;
use nexus_domain::Result;

use crate::api::client::{ClientCore, RefreshPolicy};
use crate::api::request::{ApiRequest, RawTransport};
use crate::api::stream::into_byte_stream;

/// Artifact endpoints
#[derive(Clone)]
pub struct ArtifactsClient {
    core: Arc<ClientCore>,
}

impl ArtifactsClient {
    pub(crate) fn new(core: Arc<ClientCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl ArtifactsApi for ArtifactsClient {
    async fn download(&self, artifact_id: &str) -> Result<ByteStream> {
        let request =
            ApiRequest::get(format!("{ROUTE_ARTIFACTS}/{}", urlencoding::encode(artifact_id)))
                .accept("application/octet-stream");
        let response =
            self.core.invoke::<RawTransport>(request, RefreshPolicy::OnExpiredToken).await?;
        Ok(into_byte_stream(response))
    }
}
