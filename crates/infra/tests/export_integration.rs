//! End-to-end export against a mock server: submit, poll, download, extract.

#[path = "support.rs"]
mod support;

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use nexus_domain::{ApiError, ExportParameters};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{test_client, zip_archive};

const JOB_ID: &str = "0b4fb53a-1c4f-4c4a-8d5e-5a0a4e3f1c2d";

fn parameters() -> ExportParameters {
    ExportParameters::new(
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap(),
        ["/a/b/c/T1/1_s"],
    )
}

async fn mount_job(server: &MockServer, final_status: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/v1/jobs/export"))
        .and(body_partial_json(json!({ "resourcePaths": ["/a/b/c/T1/1_s"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": JOB_ID,
            "type": "export",
            "owner": "test",
            "parameters": null
        })))
        .expect(1)
        .mount(server)
        .await;

    // First poll reports progress, every later poll the final status.
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/jobs/{JOB_ID}/status")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "Running", "progress": 0.5 })),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/jobs/{JOB_ID}/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(final_status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn exports_and_extracts_artifact() {
    let server = MockServer::start().await;
    mount_job(
        &server,
        json!({ "status": "RanToCompletion", "progress": 1.0, "result": "artifact 1" }),
    )
    .await;
    let archive = zip_archive(&[
        ("T1_2020-01-01.csv", b"time,T1\n"),
        ("nested/readme.txt", b"exported"),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/artifacts/artifact%201"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .expect(1)
        .mount(&server)
        .await;

    let target = TempDir::new().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let on_progress = {
        let events = Arc::clone(&events);
        move |progress: f64, phase: &str| events.lock().unwrap().push((progress, phase.to_owned()))
    };

    let client = test_client(&server);
    client
        .export(
            &parameters().with_file_format("Nexus.Writers.Csv"),
            target.path(),
            Some(&on_progress),
            None,
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(target.path().join("nested/readme.txt")).unwrap(), b"exported");
    assert!(target.path().join("T1_2020-01-01.csv").exists());

    let events = std::mem::take(&mut *events.lock().unwrap());
    let phase = |name: &str| -> Vec<f64> {
        events.iter().filter(|(_, p)| p == name).map(|(value, _)| *value).collect()
    };

    assert_eq!(phase("export"), vec![0.5, 1.0]);
    assert_eq!(phase("extract"), vec![1.0]);

    let download = phase("download");
    assert!(download.windows(2).all(|pair| pair[0] <= pair[1]), "{download:?}");
    assert_eq!(download.iter().filter(|value| **value == 1.0).count(), 1);
    assert_eq!(download.last(), Some(&1.0));
}

#[tokio::test]
async fn export_without_file_format_skips_download() {
    let server = MockServer::start().await;
    mount_job(
        &server,
        json!({ "status": "RanToCompletion", "progress": 1.0, "result": "artifact-1" }),
    )
    .await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let on_progress = {
        let events = Arc::clone(&events);
        move |progress: f64, phase: &str| events.lock().unwrap().push((progress, phase.to_owned()))
    };

    let target = TempDir::new().unwrap();
    test_client(&server).export(&parameters(), target.path(), Some(&on_progress), None).await.unwrap();

    assert_eq!(
        std::mem::take(&mut *events.lock().unwrap()),
        vec![(0.5, "export".to_owned()), (1.0, "export".to_owned())]
    );
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| !request.url.path().starts_with("/api/v1/artifacts")));
}

#[tokio::test]
async fn faulted_job_reports_reason() {
    let server = MockServer::start().await;
    mount_job(
        &server,
        json!({ "status": "Faulted", "progress": 0.5, "exceptionMessage": "disk full" }),
    )
    .await;

    let target = TempDir::new().unwrap();
    let err = test_client(&server).export(&parameters(), target.path(), None, None).await.unwrap_err();

    assert_eq!(err, ApiError::JobFaulted { reason: "disk full".into() });
    assert_eq!(err.code(), "N03");
}

#[tokio::test]
async fn completed_job_without_artifact_id_is_invalid() {
    let server = MockServer::start().await;
    mount_job(&server, json!({ "status": "RanToCompletion", "progress": 1.0, "result": 42 })).await;

    let target = TempDir::new().unwrap();
    let err = test_client(&server).export(&parameters(), target.path(), None, None).await.unwrap_err();

    assert_eq!(err, ApiError::InvalidJobResult);
}

#[tokio::test]
async fn corrupt_artifact_fails_extraction() {
    let server = MockServer::start().await;
    mount_job(
        &server,
        json!({ "status": "RanToCompletion", "progress": 1.0, "result": "artifact-1" }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/artifacts/artifact-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
        .mount(&server)
        .await;

    let target = TempDir::new().unwrap();
    let err = test_client(&server)
        .export(&parameters().with_file_format("Nexus.Writers.Csv"), target.path(), None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Archive(_)), "{err:?}");
}
