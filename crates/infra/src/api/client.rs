//! Nexus API client
//!
//! Owns the HTTP transport, the authentication state and the optional
//! configuration header of one client instance, and runs every API call
//! through [`NexusClient::invoke`]:
//!
//! 1. Build the request (base URL, `Accept`/`Content-Type` overrides,
//!    current `Authorization` and configuration headers)
//! 2. Send it
//! 3. On a 401 for an authenticated client whose challenge reports an expired
//!    token, refresh once and resend the identical request
//! 4. If the credentials are still rejected, sign out
//! 5. Fail with a transport error, or complete the requested result kind

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use nexus_core::{ExportProgress, LoadProgress, MemoryTokenStore, TokenManager, TokenStore};
use nexus_domain::constants::{ROUTE_REFRESH_TOKEN, TOKEN_EXPIRED_MARKER};
use nexus_domain::{
    ApiError, ClientConfig, DataResponse, ExportParameters, RefreshTokenRequest, Result, TokenPair,
};
use parking_lot::RwLock;
use reqwest::header::{
    HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE,
};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::configuration::ConfigurationGuard;
use super::request::{ApiRequest, DecodeAs, ResultKind};
use super::resources::{ArtifactsClient, CatalogsClient, DataClient, JobsClient, UsersClient};
use crate::auth::FileTokenStore;
use crate::data::BatchLoader;
use crate::http::HttpClient;
use crate::jobs::JobOrchestrator;
use crate::observability::{ClientMetrics, MetricsSnapshot};

/// Whether a failed call may trigger the refresh-and-resend policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshPolicy {
    OnExpiredToken,
    /// Used by the refresh endpoint itself, which runs inside the refresh
    /// critical section.
    Never,
}

/// State shared by the client, its sub-clients and configuration guards.
pub(crate) struct ClientCore {
    http: HttpClient,
    base_url: Url,
    tokens: TokenManager,
    configuration_header: HeaderName,
    configuration: RwLock<Option<HeaderValue>>,
    config: ClientConfig,
    metrics: ClientMetrics,
}

impl ClientCore {
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub(crate) async fn invoke<K: ResultKind>(
        &self,
        request: ApiRequest,
        policy: RefreshPolicy,
    ) -> Result<K::Output> {
        // The refresh token in use when the request went out; a concurrent
        // refresh may rotate it before the response arrives.
        let presented = self.tokens.refresh_token();
        let response = self.send(&request).await?;

        let response = if response.status().is_success() {
            response
        } else {
            self.recover(&request, response, presented, policy).await?
        };

        K::complete(response).await
    }

    /// Failure path of [`invoke`](Self::invoke): returns a successful resent
    /// response or the transport error.
    async fn recover(
        &self,
        request: &ApiRequest,
        mut response: Response,
        presented: Option<String>,
        policy: RefreshPolicy,
    ) -> Result<Response> {
        if policy == RefreshPolicy::OnExpiredToken
            && response.status() == StatusCode::UNAUTHORIZED
            && self.tokens.is_authenticated()
        {
            let mut recovered = false;

            if let Some(presented) = presented.filter(|_| token_expired(&response)) {
                match self.refresh_and_resend(request, &presented).await {
                    Ok(resent) => {
                        response = resent;
                        recovered = true;
                    }
                    Err(err) => warn!(error = %err, "Token refresh failed"),
                }
            }

            // A resent request failing for other reasons keeps the fresh session.
            if !recovered || response.status() == StatusCode::UNAUTHORIZED {
                warn!(status = %response.status(), "Credentials rejected, signing out");
                self.tokens.sign_out();
                self.metrics.record_forced_sign_out();
            }
        }

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(status, error = %err, "Failed to read error response body");
                String::new()
            }
        };
        let err = ApiError::transport(status, &body);
        debug!(label = self.metrics.record_failure(&err), code = %err.code(), "Request failed");
        Err(err)
    }

    async fn refresh_and_resend(&self, request: &ApiRequest, presented: &str) -> Result<Response> {
        self.tokens.refresh(presented, |token| self.redeem(token)).await?;
        self.metrics.record_refresh();

        debug!("Resending request with refreshed token");
        self.send(request).await
    }

    /// Exchange a refresh token at the refresh endpoint.
    ///
    /// Boxed because it is reached from inside [`invoke`](Self::invoke).
    pub(crate) fn redeem(&self, refresh_token: String) -> BoxFuture<'_, Result<TokenPair>> {
        async move {
            let request = ApiRequest::post(ROUTE_REFRESH_TOKEN)
                .json(&RefreshTokenRequest::new(refresh_token))?;
            self.invoke::<DecodeAs<TokenPair>>(request, RefreshPolicy::Never).await
        }
        .boxed()
    }

    async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.base_url.join(&request.path).map_err(|err| {
            ApiError::Config(format!("invalid request path '{}': {err}", request.path))
        })?;

        let mut builder = self.http.request(request.method.clone(), url);

        if let Some(accept) = &request.accept {
            builder = builder.header(ACCEPT, accept);
        }

        if let Some(body) = &request.body {
            if let Some(content_type) = &request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.body(body.clone());
        }

        if let Some(authorization) = self.tokens.authorization_header() {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let configuration = self.configuration.read().clone();
        if let Some(value) = configuration {
            builder = builder.header(self.configuration_header.clone(), value);
        }

        self.metrics.record_request();
        self.http.send(builder).await
    }

    pub(crate) fn set_configuration(&self, value: Option<HeaderValue>) {
        *self.configuration.write() = value;
    }
}

fn token_expired(response: &Response) -> bool {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(TOKEN_EXPIRED_MARKER))
}

/// Client for the Nexus system
///
/// Cheap to clone; clones share the connection pool, the authentication state
/// and the configuration header. The connection is released when the last
/// clone (including sub-clients and configuration guards) is dropped.
#[derive(Clone)]
pub struct NexusClient {
    core: Arc<ClientCore>,
}

impl NexusClient {
    /// Create a client for `base_url` with default settings and the file
    /// token store under the home directory.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder().config(ClientConfig::new(base_url)).build()
    }

    /// Create a client from a loaded configuration.
    ///
    /// # Errors
    /// See [`NexusClientBuilder::build`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> NexusClientBuilder {
        NexusClientBuilder::default()
    }

    /// Base URL all request paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.core.base_url
    }

    /// `true` while a token pair is held.
    pub fn is_authenticated(&self) -> bool {
        self.core.tokens.is_authenticated()
    }

    /// Request, refresh and sign-out counters of this client.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.core.metrics.snapshot()
    }

    /// Run one API call. See the module docs for the retry policy.
    ///
    /// # Errors
    /// - [`ApiError::Transport`] for a non-success status
    /// - [`ApiError::Network`] when no response was received
    /// - [`ApiError::Decode`] when a `DecodeAs` body cannot be decoded
    pub async fn invoke<K: ResultKind>(&self, request: ApiRequest) -> Result<K::Output> {
        self.core.invoke::<K>(request, RefreshPolicy::OnExpiredToken).await
    }

    /// Sign in with a refresh token.
    ///
    /// The token store is consulted first, so signing in again with the
    /// original token after a restart redeems the latest rotated token.
    ///
    /// # Errors
    /// Returns the token store error or the refresh endpoint error.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, refresh_token: &str) -> Result<()> {
        let core = &self.core;
        core.tokens.sign_in(refresh_token, |token| core.redeem(token)).await
    }

    /// Drop the held token pair. Idempotent.
    pub fn sign_out(&self) {
        self.core.tokens.sign_out();
    }

    /// Attach configuration data to subsequent requests.
    ///
    /// The value is sent as base64-encoded JSON in the configuration header
    /// until the returned guard is dropped or
    /// [`clear_configuration`](Self::clear_configuration) is called.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if `configuration` cannot be serialized.
    pub fn attach_configuration<T: Serialize + ?Sized>(
        &self,
        configuration: &T,
    ) -> Result<ConfigurationGuard> {
        let encoded = BASE64_STANDARD.encode(serde_json::to_vec(configuration)?);
        let value = HeaderValue::from_str(&encoded)
            .map_err(|err| ApiError::Config(format!("invalid configuration header: {err}")))?;

        self.core.set_configuration(Some(value));
        debug!(header = %self.core.configuration_header, "Configuration attached");

        Ok(ConfigurationGuard::new(self.core.clone()))
    }

    /// Clear configuration data for all subsequent requests.
    pub fn clear_configuration(&self) {
        self.core.set_configuration(None);
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.core.clone())
    }

    pub fn jobs(&self) -> JobsClient {
        JobsClient::new(self.core.clone())
    }

    pub fn artifacts(&self) -> ArtifactsClient {
        ArtifactsClient::new(self.core.clone())
    }

    pub fn catalogs(&self) -> CatalogsClient {
        CatalogsClient::new(self.core.clone())
    }

    pub fn data(&self) -> DataClient {
        DataClient::new(self.core.clone())
    }

    /// Job orchestrator backed by this client, for callers that need a
    /// deadline or a different poll interval.
    pub fn job_orchestrator(&self) -> JobOrchestrator {
        JobOrchestrator::new(Arc::new(self.jobs()), Arc::new(self.artifacts()))
            .with_poll_interval(self.core.config().job_poll_interval())
    }

    /// Export resources into `target_folder`.
    ///
    /// # Errors
    /// See [`JobOrchestrator::export`].
    pub async fn export(
        &self,
        parameters: &ExportParameters,
        target_folder: &Path,
        on_progress: Option<&ExportProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        self.job_orchestrator().export(parameters, target_folder, on_progress, cancel).await
    }

    /// Load several resources at once.
    ///
    /// # Errors
    /// See [`BatchLoader::load`].
    pub async fn load(
        &self,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        resource_paths: &[String],
        on_progress: Option<&LoadProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<HashMap<String, DataResponse>> {
        BatchLoader::new(Arc::new(self.catalogs()), Arc::new(self.data()))
            .load(begin, end, resource_paths, on_progress, cancel)
            .await
    }
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient")
            .field("base_url", &self.core.base_url.as_str())
            .field("tokens", &self.core.tokens)
            .finish_non_exhaustive()
    }
}

/// Builder for [`NexusClient`]
#[derive(Default)]
pub struct NexusClientBuilder {
    config: Option<ClientConfig>,
    token_store: Option<Arc<dyn TokenStore>>,
    http_client: Option<HttpClient>,
}

impl NexusClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the file token store
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Keep refresh tokens in memory only
    pub fn in_memory_tokens(self) -> Self {
        self.token_store(Arc::new(MemoryTokenStore::new()))
    }

    /// Use a preconfigured HTTP client instead of one built from the
    /// configuration
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if no configuration was set, the base URL
    /// or configuration header key is invalid, or the token cache directory
    /// cannot be resolved.
    pub fn build(self) -> Result<NexusClient> {
        let config =
            self.config.ok_or_else(|| ApiError::Config("client configuration not set".into()))?;

        let base_url = parse_base_url(&config.base_url)?;

        let configuration_header = HeaderName::from_bytes(config.configuration_header_key.as_bytes())
            .map_err(|err| {
                ApiError::Config(format!(
                    "invalid configuration header key '{}': {err}",
                    config.configuration_header_key
                ))
            })?;

        let http = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = HttpClient::builder().timeout(config.timeout());
                if let Some(agent) = &config.user_agent {
                    builder = builder.user_agent(agent.clone());
                }
                builder.build()?
            }
        };

        let store: Arc<dyn TokenStore> = match self.token_store {
            Some(store) => store,
            None => Arc::new(match &config.token_cache_dir {
                Some(dir) => FileTokenStore::new(dir.clone()),
                None => FileTokenStore::in_home_dir()?,
            }),
        };

        info!(base_url = %base_url, "Nexus client created");

        Ok(NexusClient {
            core: Arc::new(ClientCore {
                http,
                base_url,
                tokens: TokenManager::new(store),
                configuration_header,
                configuration: RwLock::new(None),
                config,
                metrics: ClientMetrics::new(),
            }),
        })
    }
}

/// Parse the base URL so that relative request paths keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|err| ApiError::Config(format!("invalid base URL '{raw}': {err}")))?;

    if url.cannot_be_a_base() {
        return Err(ApiError::Config(format!("invalid base URL '{raw}': not a base")));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::request::{RawTransport, Unit};

    fn test_client(server: &MockServer) -> NexusClient {
        NexusClient::builder()
            .config(ClientConfig::new(server.uri()))
            .in_memory_tokens()
            .build()
            .unwrap()
    }

    async fn mount_refresh(server: &MockServer, presented: &str, access: &str, refresh: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/users/tokens/refresh"))
            .and(body_json(json!({ "refreshToken": presented })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": access, "refreshToken": refresh })),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let url = parse_base_url("https://nexus.example.org/prefix").unwrap();
        assert_eq!(url.join("api/v1/jobs").unwrap().as_str(), "https://nexus.example.org/prefix/api/v1/jobs");
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn builder_requires_config() {
        let result = NexusClient::builder().in_memory_tokens().build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn builder_rejects_bad_header_key() {
        let mut config = ClientConfig::new("http://localhost:5000");
        config.configuration_header_key = "bad header".into();
        let result = NexusClient::builder().config(config).in_memory_tokens().build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn decodes_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "a": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let value: HashMap<String, i32> =
            client.invoke::<DecodeAs<HashMap<String, i32>>>(ApiRequest::get("status")).await.unwrap();

        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn null_response_body_fails_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nothing"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .invoke::<DecodeAs<serde_json::Value>>(ApiRequest::get("nothing"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "N01");
    }

    #[tokio::test]
    async fn unit_and_raw_results() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1_u8, 2, 3]))
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .invoke::<Unit>(ApiRequest::new(reqwest::Method::DELETE, "thing"))
            .await
            .unwrap();

        let response = client.invoke::<RawTransport>(ApiRequest::get("raw")).await.unwrap();
        assert_eq!(response.bytes().await.unwrap().as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn undecodable_body_is_n01() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .invoke::<DecodeAs<HashMap<String, i32>>>(ApiRequest::get("empty"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "N01");
    }

    #[tokio::test]
    async fn failure_embeds_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such resource"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.invoke::<Unit>(ApiRequest::get("missing")).await.unwrap_err();

        assert_eq!(err.code(), "N00.404");
        assert!(err.to_string().ends_with("The response message is: no such resource"));
    }

    #[tokio::test]
    async fn sends_overrides_and_auth_header() {
        let server = MockServer::start().await;
        mount_refresh(&server, "r0", "a1", "r1").await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("authorization", "Bearer a1"))
            .and(header("accept", "text/plain"))
            .and(header("content-type", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.sign_in("r0").await.unwrap();

        client
            .invoke::<Unit>(
                ApiRequest::post("upload")
                    .accept("text/plain")
                    .body(vec![0_u8; 4], "application/octet-stream"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unauthenticated_401_does_not_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("WWW-Authenticate", "Bearer error_description=\"The token expired at 01/01/2020\""),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.invoke::<Unit>(ApiRequest::get("secure")).await.unwrap_err();

        assert_eq!(err.code(), "N00.401");
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn configuration_header_is_scoped_to_guard() {
        let server = MockServer::start().await;
        let encoded = BASE64_STANDARD.encode(br#"{"x":1}"#);
        Mock::given(method("GET"))
            .and(path("/with"))
            .and(header("Nexus-Configuration", encoded.as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/without"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        {
            let _guard = client.attach_configuration(&json!({ "x": 1 })).unwrap();
            client.invoke::<Unit>(ApiRequest::get("with")).await.unwrap();
        }
        client.invoke::<Unit>(ApiRequest::get("without")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[1].headers.get("Nexus-Configuration").is_none());
    }
}
