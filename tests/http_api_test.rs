/// HTTP surface tests against a live listener
///
/// Tests cover:
/// - Upload, progress stream and artifact download end to end
/// - Unknown job progress
/// - Request validation and `/status`
mod utils;

use isolator_lib::commands::build_router;
use isolator_lib::modules::jobs::{JobSnapshot, JobStatus};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use utils::factories::{FakeSeparator, FakeTranscoder, NO_VOCALS_BYTES};
use utils::helpers::{build_test_app, TestApp};

async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Read an SSE body to the end and decode every `data:` line
async fn read_snapshots(url: String) -> Vec<JobSnapshot> {
    let body = tokio::time::timeout(Duration::from_secs(5), async move {
        reqwest::get(url).await.unwrap().text().await.unwrap()
    })
    .await
    .expect("progress stream should close");

    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

#[tokio::test]
async fn upload_stream_and_download_round_trip() {
    let app = build_test_app(Arc::new(FakeSeparator::new()), Arc::new(FakeTranscoder::new()));
    let addr = serve(&app).await;
    let client = reqwest::Client::new();

    let form = Form::new()
        .part("file", Part::bytes(b"RIFF....WAVE".to_vec()).file_name("song.wav"))
        .text("mode", "instrumental_only");
    let response: Value = client
        .post(format!("http://{}/isolate", addr))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(response["status"], "ok");
    let job_id = response["job_id"].as_str().unwrap().to_string();

    let snapshots = read_snapshots(format!("http://{}/progress/{}", addr, job_id)).await;
    let last = snapshots.last().unwrap();
    assert_eq!(last.status, JobStatus::Complete);
    assert_eq!(last.progress, 100);

    let output = last.output.clone().unwrap();
    assert_eq!(output, format!("/media/{}/output.wav", job_id));

    let download = client
        .get(format!("http://{}{}", addr, output))
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), 200);
    assert_eq!(download.headers()["content-type"], "audio/wav");
    assert_eq!(download.bytes().await.unwrap().as_ref(), NO_VOCALS_BYTES);
}

#[tokio::test]
async fn unknown_mode_falls_back_to_instrumental() {
    let app = build_test_app(Arc::new(FakeSeparator::new()), Arc::new(FakeTranscoder::new()));
    let addr = serve(&app).await;

    let form = Form::new()
        .part("file", Part::bytes(b"RIFF".to_vec()).file_name("song.wav"))
        .text("mode", "karaoke");
    let response: Value = reqwest::Client::new()
        .post(format!("http://{}/isolate", addr))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let job_id = response["job_id"].as_str().unwrap();

    let snapshots = read_snapshots(format!("http://{}/progress/{}", addr, job_id)).await;
    assert_eq!(snapshots[0].mode.map(|m| m.to_string()).as_deref(), Some("instrumental_only"));
}

#[tokio::test]
async fn progress_for_unknown_job_is_a_single_error_event() {
    let app = build_test_app(Arc::new(FakeSeparator::new()), Arc::new(FakeTranscoder::new()));
    let addr = serve(&app).await;

    let snapshots = read_snapshots(format!("http://{}/progress/{}", addr, uuid::Uuid::new_v4())).await;

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].status, JobStatus::Error);
    assert_eq!(snapshots[0].message, "Job not found");
}

#[tokio::test]
async fn isolate_without_file_is_bad_request() {
    let app = build_test_app(Arc::new(FakeSeparator::new()), Arc::new(FakeTranscoder::new()));
    let addr = serve(&app).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/isolate", addr))
        .multipart(Form::new().text("mode", "vocals_only"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["type"], "InvalidInput");
}

#[tokio::test]
async fn missing_media_is_not_found() {
    let app = build_test_app(Arc::new(FakeSeparator::new()), Arc::new(FakeTranscoder::new()));
    let addr = serve(&app).await;

    let response = reqwest::get(format!("http://{}/media/nope/output.wav", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn status_reports_version_and_counts() {
    let app = build_test_app(Arc::new(FakeSeparator::failing(1)), Arc::new(FakeTranscoder::new()));
    let addr = serve(&app).await;

    let (_, handle) = app
        .state
        .scheduler
        .submit_tracked(
            b"RIFF".to_vec(),
            "song.wav",
            isolator_lib::modules::separation::IsolationMode::VocalsOnly,
        )
        .await
        .unwrap();
    handle.await.unwrap();

    let body: Value = reqwest::get(format!("http://{}/status", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["jobs"]["error_count"], 1);
    assert_eq!(body["jobs"]["total_count"], 1);
}
