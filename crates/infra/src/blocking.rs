//! Synchronous facade over [`NexusClient`]
//!
//! [`BlockingClient`] owns a current-thread tokio runtime and drives the async
//! client to completion on it, so the retry, refresh and progress semantics
//! are exactly those of the async client. It must not be used (or dropped)
//! from inside another tokio runtime.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use chrono::{DateTime, Utc};
use nexus_core::{ExportProgress, LoadProgress};
use nexus_domain::{ClientConfig, DataResponse, ExportParameters, Result};
use serde::Serialize;
use tokio::runtime::{Builder as RuntimeBuilder, Runtime};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiRequest, ConfigurationGuard, NexusClient, ResultKind};
use crate::errors::to_api_error;
use crate::observability::MetricsSnapshot;

/// Blocking Nexus client
pub struct BlockingClient {
    client: NexusClient,
    runtime: Runtime,
}

impl BlockingClient {
    /// Wrap an async client.
    ///
    /// # Errors
    /// Returns [`nexus_domain::ApiError::Io`] if the runtime cannot be
    /// created.
    pub fn new(client: NexusClient) -> Result<Self> {
        let runtime = RuntimeBuilder::new_current_thread().enable_all().build().map_err(to_api_error)?;
        Ok(Self { client, runtime })
    }

    /// Build a client from configuration with the file token store.
    ///
    /// # Errors
    /// See [`crate::api::NexusClientBuilder::build`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Self::new(NexusClient::from_config(config)?)
    }

    /// The wrapped async client
    pub fn client(&self) -> &NexusClient {
        &self.client
    }

    /// Run any future (for example a sub-client call) to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.client.metrics()
    }

    /// # Errors
    /// See [`NexusClient::sign_in`].
    pub fn sign_in(&self, refresh_token: &str) -> Result<()> {
        self.block_on(self.client.sign_in(refresh_token))
    }

    pub fn sign_out(&self) {
        self.client.sign_out();
    }

    /// # Errors
    /// See [`NexusClient::invoke`].
    pub fn invoke<K: ResultKind>(&self, request: ApiRequest) -> Result<K::Output> {
        self.block_on(self.client.invoke::<K>(request))
    }

    /// # Errors
    /// See [`NexusClient::attach_configuration`].
    pub fn attach_configuration<T: Serialize + ?Sized>(
        &self,
        configuration: &T,
    ) -> Result<ConfigurationGuard> {
        self.client.attach_configuration(configuration)
    }

    pub fn clear_configuration(&self) {
        self.client.clear_configuration();
    }

    /// # Errors
    /// See [`NexusClient::export`].
    pub fn export(
        &self,
        parameters: &ExportParameters,
        target_folder: &Path,
        on_progress: Option<&ExportProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        self.block_on(self.client.export(parameters, target_folder, on_progress, cancel))
    }

    /// # Errors
    /// See [`NexusClient::load`].
    pub fn load(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        resource_paths: &[String],
        on_progress: Option<&LoadProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<HashMap<String, DataResponse>> {
        self.block_on(self.client.load(begin, end, resource_paths, on_progress, cancel))
    }
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient").field("client", &self.client).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::DecodeAs;

    /// The mock server lives on its own multi-thread runtime so the blocking
    /// client can drive its current-thread runtime from the test thread.
    fn start_server() -> (Runtime, MockServer) {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        (runtime, server)
    }

    fn blocking_client(server: &MockServer) -> BlockingClient {
        let client = NexusClient::builder()
            .config(ClientConfig::new(server.uri()))
            .in_memory_tokens()
            .build()
            .unwrap();
        BlockingClient::new(client).unwrap()
    }

    #[test]
    fn sign_in_and_invoke_without_async_caller() {
        let (server_runtime, server) = start_server();
        server_runtime.block_on(async {
            Mock::given(method("POST"))
                .and(path("/api/v1/users/tokens/refresh"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "accessToken": "a1", "refreshToken": "r1" })),
                )
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/status"))
                .and(header("authorization", "Bearer a1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "a": 1 })))
                .mount(&server)
                .await;
        });

        let client = blocking_client(&server);
        client.sign_in("r0").unwrap();
        assert!(client.is_authenticated());

        let value =
            client.invoke::<DecodeAs<HashMap<String, i32>>>(ApiRequest::get("status")).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(client.metrics().requests, 2);

        client.sign_out();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn transport_errors_surface_unchanged() {
        let (server_runtime, server) = start_server();
        server_runtime.block_on(
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server),
        );

        let client = blocking_client(&server);
        let err = client.invoke::<crate::api::Unit>(ApiRequest::get("down")).unwrap_err();
        assert_eq!(err.code(), "N00.503");
    }
}
