//! Shared fixtures for the infra integration suites.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use nexus_core::TokenStore;
use nexus_domain::ClientConfig;
use nexus_infra::NexusClient;
use serde_json::json;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const REFRESH_ROUTE: &str = "/api/v1/users/tokens/refresh";

/// Client against `server` with fast job polling and in-memory tokens.
pub fn test_client(server: &MockServer) -> NexusClient {
    NexusClient::builder().config(test_config(server)).in_memory_tokens().build().unwrap()
}

/// Client against `server` persisting refresh tokens in `store`.
pub fn client_with_store(server: &MockServer, store: Arc<dyn TokenStore>) -> NexusClient {
    NexusClient::builder().config(test_config(server)).token_store(store).build().unwrap()
}

fn test_config(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new(server.uri());
    config.job_poll_interval_ms = 10;
    config.timeout_seconds = 5;
    config
}

/// Refresh endpoint exchanging `presented` for `(access, refresh)`.
pub fn refresh_mock(presented: &str, access: &str, refresh: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(REFRESH_ROUTE))
        .and(body_json(json!({ "refreshToken": presented })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": access, "refreshToken": refresh })),
        )
}

/// 401 whose challenge reports an expired access token.
pub fn expired_token() -> ResponseTemplate {
    ResponseTemplate::new(401).insert_header(
        "WWW-Authenticate",
        "Bearer error=\"invalid_token\", error_description=\"The token expired at '01/01/2020 00:00:00'\"",
    )
}

/// In-memory zip archive holding `files`.
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Native-endian float64 payload as served by the data endpoint.
pub fn f64_payload(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

/// Handle for inspecting captured log output during tests.
#[derive(Clone, Default)]
pub struct LogHandle {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogHandle {
    /// All captured output
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Check whether a line at `level` contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.contents().lines().any(|line| line.contains(level) && line.contains(needle))
    }
}

impl Write for LogHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogHandle {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture log output of the current thread until the guard is dropped.
///
/// Only valid with the current-thread test runtime.
pub fn capture_logs() -> (LogHandle, DefaultGuard) {
    let handle = LogHandle::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(handle.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (handle, guard)
}
