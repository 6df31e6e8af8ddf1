//! End-to-end tests for the ad placement & composition HTTP surface.
//!
//! Starts a real Axum server on an ephemeral port and drives it over HTTP,
//! the same way the teacher's SSAI e2e suite drove its manifest endpoints.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use adstitch::config::Config;
use adstitch::server::build_router;
use base64::Engine;
use serde_json::{Value, json};

fn fake_jwt(sub: &str) -> String {
    let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload =
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
    format!("{header}.{payload}.sig")
}

fn test_config(output_root: PathBuf) -> Config {
    Config {
        port: 0,
        base_url: "http://localhost".to_string(),
        is_dev: true,
        output_root,
        segment_duration: 6.0,
        default_buffer_before_s: 10.0,
        default_buffer_after_s: 3.0,
        oracle_api_key: String::new(),
        oracle_base_url: "https://example.invalid".to_string(),
        oracle_model: "test-model".to_string(),
        oracle_vision_model: "test-vision-model".to_string(),
        oracle_timeout_s: 5,
        generation_api_key: String::new(),
        generation_base_url: "https://example.invalid".to_string(),
        generation_poll_interval_s: 1,
        generation_timeout_s: 5,
        generation_max_consecutive_errors: 1,
        prompt_template_path: None,
        placement_candidates: 5,
        min_gap_s: 1.5,
    }
}

async fn start_test_server() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(dir.path().to_path_buf());
    let app = build_router(config).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, dir)
}

#[tokio::test]
async fn health_check_reports_ok() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["jobs_tracked"], 0);
}

#[tokio::test]
async fn process_video_requires_auth() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/v1/videos/process"))
        .json(&json!({
            "video_path": "/tmp/does-not-exist.mp4",
            "subtitle_path": "/tmp/does-not-exist.srt",
            "product": {"company": "Acme", "product": "Widget", "category": "tools"},
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn process_video_rejects_empty_video_path() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();
    let token = fake_jwt("alice");

    let resp = client
        .post(format!("http://{addr}/api/v1/videos/process"))
        .bearer_auth(&token)
        .json(&json!({
            "video_path": "",
            "subtitle_path": "/tmp/does-not-exist.srt",
            "product": {"company": "Acme", "product": "Widget", "category": "tools"},
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "invalid-input");
}

#[tokio::test]
async fn submit_then_status_eventually_fails_on_missing_media() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();
    let token = fake_jwt("alice");

    let resp = client
        .post(format!("http://{addr}/api/v1/videos/process"))
        .bearer_auth(&token)
        .json(&json!({
            "video_path": "/tmp/adstitch-e2e-missing.mp4",
            "subtitle_path": "/tmp/adstitch-e2e-missing.srt",
            "product": {"company": "Acme", "product": "Widget", "category": "tools"},
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "queued");
    let job_id = body["job_id"].as_str().unwrap().to_string();

    // The background pipeline fails fast since neither input file exists;
    // poll status until it does rather than assuming a fixed delay.
    let mut status = String::new();
    for _ in 0..50 {
        let status_resp = client
            .get(format!("http://{addr}/api/v1/videos/status/{job_id}"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(status_resp.status(), 200);
        let status_body: Value = status_resp.json().await.unwrap();
        status = status_body["status"].as_str().unwrap().to_string();
        if status == "failed" {
            assert!(status_body["error"].is_string());
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(status, "failed");
}

#[tokio::test]
async fn status_rejects_wrong_owner() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();
    let alice = fake_jwt("alice");
    let bob = fake_jwt("bob");

    let resp = client
        .post(format!("http://{addr}/api/v1/videos/process"))
        .bearer_auth(&alice)
        .json(&json!({
            "video_path": "/tmp/adstitch-e2e-owner.mp4",
            "subtitle_path": "/tmp/adstitch-e2e-owner.srt",
            "product": {"company": "Acme", "product": "Widget", "category": "tools"},
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let job_id = body["job_id"].as_str().unwrap();

    let status_resp = client
        .get(format!("http://{addr}/api/v1/videos/status/{job_id}"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(status_resp.status(), 403);

    let unknown_resp = client
        .get(format!("http://{addr}/api/v1/videos/status/{}", uuid::Uuid::new_v4()))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_resp.status(), 404);
}

#[tokio::test]
async fn playlist_404s_for_unknown_job() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();
    let token = fake_jwt("alice");

    let resp = client
        .get(format!("http://{addr}/api/v1/videos/playlist/{}.m3u8", uuid::Uuid::new_v4()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn analytics_event_is_accepted_without_auth() {
    let (addr, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    for kind in ["impressions", "clicks", "views", "conversions", "dismissals"] {
        let resp = client
            .post(format!("http://{addr}/api/v1/analytics/{kind}"))
            .json(&json!({"ad_id": "ad-123"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "kind={kind}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
    }
}
