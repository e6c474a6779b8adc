//! Integration tests for the download engine.
//!
//! These tests drive the full per-item pipeline (key fetch, conversion,
//! artifact streaming) against mock HTTP servers and verify the retry and
//! failure-isolation behavior of the orchestrator.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytaudio_core::config::Endpoints;
use ytaudio_core::{
    ArtifactFetcher, ConversionClient, DownloadError, Downloader, Engine, PlaylistItem,
    RetryPolicy, TokenProvider, build_http_client,
};

/// Builds a downloader wired against a mock conversion service.
fn build_downloader(base: &str, output_dir: &Path) -> Arc<Downloader> {
    let client = build_http_client().expect("failed to build HTTP client");
    let endpoints = Endpoints::with_base(base);
    Arc::new(Downloader::new(
        TokenProvider::new(client.clone(), &endpoints.auth_url),
        ConversionClient::new(client.clone(), &endpoints.convert_url),
        ArtifactFetcher::new(client),
        RetryPolicy::default(),
        output_dir,
    ))
}

/// Mounts a key endpoint that always returns the given key.
async fn mount_auth(server: &MockServer, key: &str) {
    Mock::given(method("GET"))
        .and(path("/v2/sanity/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": key })))
        .mount(server)
        .await;
}

/// Mounts a conversion endpoint answering `link` with an artifact URL.
///
/// Requires the one-time key obtained from the key endpoint in the `key`
/// request header.
async fn mount_convert(server: &MockServer, key: &str, link: &str, artifact_url: &str) {
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .and(header("key", key))
        .and(body_partial_json(json!({ "link": link })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "tunnel",
            "url": artifact_url,
            "filename": "converted.mp3",
        })))
        .mount(server)
        .await;
}

/// Mounts an artifact endpoint serving the given bytes.
async fn mount_artifact(server: &MockServer, path_str: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_item_playlist_downloads_both_files() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "test-key").await;
    mount_convert(&server, "test-key", "u1", &format!("{}/files/a.mp3", server.uri())).await;
    mount_convert(&server, "test-key", "u2", &format!("{}/files/b.mp3", server.uri())).await;
    mount_artifact(&server, "/files/a.mp3", b"audio bytes A").await;
    mount_artifact(&server, "/files/b.mp3", b"audio bytes B").await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let engine = Engine::new(10).expect("valid concurrency");

    let items = vec![
        PlaylistItem::new("Song A", "u1"),
        PlaylistItem::new("Song B", "u2"),
    ];
    let outcomes = engine
        .download_all(&downloader, items)
        .await
        .expect("engine should not fail");

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(ytaudio_core::DownloadOutcome::is_success));

    let a = std::fs::read(temp_dir.path().join("Song A.mp3")).expect("Song A.mp3 should exist");
    let b = std::fs::read(temp_dir.path().join("Song B.mp3")).expect("Song B.mp3 should exist");
    assert_eq!(a, b"audio bytes A");
    assert_eq!(b, b"audio bytes B");

    assert_eq!(engine.stats().completed(), 2);
    assert_eq!(engine.stats().failed(), 0);
}

#[tokio::test]
async fn test_conversion_failing_twice_then_succeeding_reaches_done() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    // Each attempt fetches a fresh key: exactly 3 key round trips expected.
    Mock::given(method("GET"))
        .and(path("/v2/sanity/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": "k" })))
        .expect(3)
        .mount(&server)
        .await;

    // First two conversion attempts fail, the third succeeds.
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_convert(&server, "k", "u1", &format!("{}/files/a.mp3", server.uri())).await;
    mount_artifact(&server, "/files/a.mp3", b"audio").await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let outcome_path = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await
        .expect("third attempt should succeed");

    assert_eq!(outcome_path, temp_dir.path().join("Song A.mp3"));
    assert!(outcome_path.exists());
}

#[tokio::test]
async fn test_conversion_failing_every_attempt_stops_after_six() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;

    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&server)
        .await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let result = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await;

    assert!(matches!(
        result,
        Err(DownloadError::ConversionStatus { status: 503, .. })
    ));
    assert!(
        !temp_dir.path().join("Song A.mp3").exists(),
        "failed item must not produce a file"
    );
}

#[tokio::test]
async fn test_empty_conversion_body_is_retried_then_fails() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;

    // Decodable body without a download URL is a retryable failure.
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "url": null,
            "filename": null,
        })))
        .expect(6)
        .mount(&server)
        .await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let result = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await;

    assert!(matches!(result, Err(DownloadError::ConversionEmpty { .. })));
}

#[tokio::test]
async fn test_missing_auth_key_fails_after_six_attempts_without_converting() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    // Key endpoint answers but never provides a key.
    Mock::given(method("GET"))
        .and(path("/v2/sanity/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(6)
        .mount(&server)
        .await;

    // The conversion endpoint must never be reached without a key.
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let result = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await;

    assert!(matches!(result, Err(DownloadError::AuthMissingKey { .. })));
}

#[tokio::test]
async fn test_unavailable_auth_endpoint_is_retried_then_reported_with_status() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    // Key endpoint is down for the whole run: one round trip per attempt.
    Mock::given(method("GET"))
        .and(path("/v2/sanity/key"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&server)
        .await;

    // The conversion endpoint must never be reached without a key.
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let result = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await;

    assert!(matches!(
        result,
        Err(DownloadError::AuthStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_artifact_failure_is_terminal_without_reconverting() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;

    // Conversion succeeds exactly once; a fetch failure must not re-enter it.
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "tunnel",
            "url": format!("{}/files/a.mp3", server.uri()),
            "filename": "a.mp3",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/a.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let result = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await;

    assert!(matches!(
        result,
        Err(DownloadError::ArtifactStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_one_failing_item_does_not_affect_siblings() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;

    // u1 never converts; u2 converts first try.
    Mock::given(method("POST"))
        .and(path("/v2/converter"))
        .and(body_partial_json(json!({ "link": "u1" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_convert(&server, "k", "u2", &format!("{}/files/b.mp3", server.uri())).await;
    mount_artifact(&server, "/files/b.mp3", b"audio B").await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let engine = Engine::new(10).expect("valid concurrency");

    let items = vec![
        PlaylistItem::new("Song A", "u1"),
        PlaylistItem::new("Song B", "u2"),
    ];
    let outcomes = engine
        .download_all(&downloader, items)
        .await
        .expect("per-item failures must not fail the engine");

    // One outcome per input item, in submission order.
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].item.title, "Song A");
    assert!(!outcomes[0].is_success());
    assert_eq!(outcomes[1].item.title, "Song B");
    assert!(outcomes[1].is_success());

    assert!(!temp_dir.path().join("Song A.mp3").exists());
    assert_eq!(
        std::fs::read(temp_dir.path().join("Song B.mp3")).expect("Song B.mp3 should exist"),
        b"audio B"
    );

    assert_eq!(engine.stats().completed(), 1);
    assert_eq!(engine.stats().failed(), 1);
}

#[tokio::test]
async fn test_existing_file_at_destination_is_overwritten() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let dest = temp_dir.path().join("Song A.mp3");
    std::fs::write(&dest, b"stale bytes from a previous run").expect("failed to seed file");

    mount_auth(&server, "k").await;
    mount_convert(&server, "k", "u1", &format!("{}/files/a.mp3", server.uri())).await;
    mount_artifact(&server, "/files/a.mp3", b"fresh bytes").await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await
        .expect("download should succeed");

    assert_eq!(
        std::fs::read(&dest).expect("file should exist"),
        b"fresh bytes"
    );
}

#[tokio::test]
async fn test_output_directory_is_created_when_absent() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let output_dir = temp_dir.path().join("nested").join("download");

    mount_auth(&server, "k").await;
    mount_convert(&server, "k", "u1", &format!("{}/files/a.mp3", server.uri())).await;
    mount_artifact(&server, "/files/a.mp3", b"audio").await;

    let downloader = build_downloader(&server.uri(), &output_dir);
    let path = downloader
        .download_item(&PlaylistItem::new("Song A", "u1"))
        .await
        .expect("download should succeed");

    assert_eq!(path, output_dir.join("Song A.mp3"));
    assert!(path.exists());
}

#[tokio::test]
async fn test_playlist_of_n_items_yields_n_outcomes() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;
    mount_convert(&server, "k", "u1", &format!("{}/files/1.mp3", server.uri())).await;
    mount_convert(&server, "k", "u3", &format!("{}/files/3.mp3", server.uri())).await;
    mount_artifact(&server, "/files/1.mp3", b"one").await;
    mount_artifact(&server, "/files/3.mp3", b"three").await;
    // u2 has no conversion mock: falls through to wiremock's 404, which the
    // client reports as a rejected conversion and retries to exhaustion.

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let engine = Engine::new(3).expect("valid concurrency");

    let items = vec![
        PlaylistItem::new("One", "u1"),
        PlaylistItem::new("Two", "u2"),
        PlaylistItem::new("Three", "u3"),
    ];
    let outcomes = engine
        .download_all(&downloader, items)
        .await
        .expect("engine should not fail");

    assert_eq!(outcomes.len(), 3);
    let titles: Vec<&str> = outcomes.iter().map(|o| o.item.title.as_str()).collect();
    assert_eq!(titles, ["One", "Two", "Three"]);
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 2);
}

#[tokio::test]
async fn test_duplicate_titles_leave_one_complete_file() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;
    mount_convert(&server, "k", "u1", &format!("{}/files/1.mp3", server.uri())).await;
    mount_convert(&server, "k", "u2", &format!("{}/files/2.mp3", server.uri())).await;
    // Equal-length payloads so a stale tail from the losing writer would be
    // visible as mixed content rather than hidden by truncation.
    mount_artifact(&server, "/files/1.mp3", b"payload written by downloader one").await;
    mount_artifact(&server, "/files/2.mp3", b"payload written by downloader two").await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let engine = Engine::new(2).expect("valid concurrency");

    // Two concurrent items mapping to the same destination path.
    let items = vec![
        PlaylistItem::new("Song A", "u1"),
        PlaylistItem::new("Song A", "u2"),
    ];
    let outcomes = engine
        .download_all(&downloader, items)
        .await
        .expect("engine should not fail");

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(ytaudio_core::DownloadOutcome::is_success));

    // The last completed write wins; the file is never an interleaving of
    // the two payloads.
    let bytes = std::fs::read(temp_dir.path().join("Song A.mp3")).expect("file should exist");
    assert!(
        bytes == b"payload written by downloader one" || bytes == b"payload written by downloader two",
        "expected one writer's full payload, got: {:?}",
        String::from_utf8_lossy(&bytes)
    );
}

#[tokio::test]
async fn test_titles_with_path_separators_are_sanitized() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    mount_auth(&server, "k").await;
    mount_convert(&server, "k", "u1", &format!("{}/files/a.mp3", server.uri())).await;
    mount_artifact(&server, "/files/a.mp3", b"audio").await;

    let downloader = build_downloader(&server.uri(), temp_dir.path());
    let path = downloader
        .download_item(&PlaylistItem::new("AC/DC: Live", "u1"))
        .await
        .expect("download should succeed");

    assert_eq!(path, temp_dir.path().join("AC_DC_ Live.mp3"));
    assert!(path.exists());
}
