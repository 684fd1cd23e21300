// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /briefings (validation rejection path only; no network)
// - GET /audio/{id}

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use newsreel::api::{self, AppState};
use newsreel::config::AppConfig;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses, backed by a temp audio dir.
fn test_router(audio_dir: &std::path::Path) -> Router {
    let mut config = AppConfig::default();
    config.server.audio_dir = audio_dir.display().to_string();
    api::create_router(AppState::from_config(config))
}

#[tokio::test]
async fn api_health_returns_200_and_feature_list() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(tmp.path());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse health json");
    assert!(v.get("status").is_some(), "missing 'status'");
    let features = v.get("features").and_then(|f| f.as_array()).expect("features array");
    // The RSS fallbacks require no credentials and are always reported.
    assert!(features.iter().any(|f| f == "feed_rss_fallback"));
}

#[tokio::test]
async fn api_rejects_request_without_sources() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(tmp.path());

    let payload = json!({ "topics": ["elections"], "sources": [] });
    let req = Request::builder()
        .method("POST")
        .uri("/briefings")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /briefings");

    let resp = app.oneshot(req).await.expect("oneshot /briefings");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse error json");
    assert_eq!(v["error_kind"], "validation");
    assert!(
        v["message"].as_str().unwrap_or("").contains("source"),
        "message should be human-readable"
    );
}

#[tokio::test]
async fn api_rejects_request_without_topics_or_keywords() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(tmp.path());

    let payload = json!({ "sources": ["feed"] });
    let req = Request::builder()
        .method("POST")
        .uri("/briefings")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /briefings");

    let resp = app.oneshot(req).await.expect("oneshot /briefings");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn api_unknown_audio_id_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(tmp.path());

    let missing = uuid::Uuid::new_v4();
    let req = Request::builder()
        .method("GET")
        .uri(format!("/audio/{missing}"))
        .body(Body::empty())
        .expect("build GET /audio");

    let resp = app.oneshot(req).await.expect("oneshot /audio");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse error json");
    assert_eq!(v["error_kind"], "not_found");
}

#[tokio::test]
async fn api_serves_stored_audio_with_mpeg_content_type() {
    let tmp = tempfile::tempdir().unwrap();
    let store = newsreel::speech::store::AudioStore::new(tmp.path());
    let id = store.put(b"fake-mp3-bytes").unwrap();
    let app = test_router(tmp.path());

    let req = Request::builder()
        .method("GET")
        .uri(format!("/audio/{id}"))
        .body(Body::empty())
        .expect("build GET /audio");

    let resp = app.oneshot(req).await.expect("oneshot /audio");
    assert_eq!(resp.status(), StatusCode::OK);
    let ctype = resp
        .headers()
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert_eq!(ctype, "audio/mpeg");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(bytes, b"fake-mp3-bytes");
}
