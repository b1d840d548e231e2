//! Router-level tests for the relay endpoints
//!
//! Each test builds the full router against a wiremock upstream and drives
//! it with `tower::ServiceExt::oneshot`, asserting on the exact wire bodies
//! clients see.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::config::{Config, UpstreamConfig};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{header as wm_header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_TOKEN: &str = "sk-valid-token";

/// Router wired to a mock upstream
fn test_router(upstream_uri: &str) -> Router {
    let config = Config {
        upstream: UpstreamConfig {
            base_url: upstream_uri.to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    super::create_router(Arc::new(config))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn upstream_page_body() -> serde_json::Value {
    serde_json::json!({
        "items": [{
            "id": "1",
            "url": "http://x/a.png",
            "width": 100,
            "height": 100,
            "title": "t",
            "created_at": 1700000000,
            "encodings": {"thumbnail": {"path": "http://x/a_thumb.png"}}
        }],
        "cursor": "c2"
    })
}

// ---------------------------------------------------------------------------
// GET /api/images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn images_without_token_returns_401() {
    let router = test_router("http://localhost:9");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid API token");
}

#[tokio::test]
async fn images_with_short_token_returns_401() {
    let router = test_router("http://localhost:9");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .header("x-api-token", "short")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid API token");
}

#[tokio::test]
async fn images_with_whitespace_token_returns_401() {
    let router = test_router("http://localhost:9");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .header("x-api-token", "has a space in it")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn images_rewrites_urls_through_the_relay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/my/recent/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_page_body()))
        .mount(&server)
        .await;

    let response = test_router(&server.uri())
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .header("x-api-token", VALID_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["cursor"], "c2");
    assert_eq!(
        body["items"][0]["url"],
        "/proxy/image?url=http%3A%2F%2Fx%2Fa.png"
    );
    assert_eq!(
        body["items"][0]["thumbnail_url"],
        "/proxy/image?url=http%3A%2F%2Fx%2Fa_thumb.png"
    );
}

#[tokio::test]
async fn images_forwards_cursor_limit_and_team_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/my/recent/images"))
        .and(query_param("after", "c1"))
        .and(query_param("limit", "25"))
        .and(wm_header("x-account-id", "team-1"))
        .and(wm_header("authorization", format!("Bearer {VALID_TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"items": [], "cursor": null})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = test_router(&server.uri())
        .oneshot(
            Request::builder()
                .uri("/api/images?after=c1&limit=25")
                .header("x-api-token", VALID_TOKEN)
                .header("x-team-id", "team-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn images_maps_upstream_401_to_502_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/my/recent/images"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let response = test_router(&server.uri())
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .header("x-api-token", VALID_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["details"], "upstream returned 401 Unauthorized");
}

#[tokio::test]
async fn images_maps_upstream_500_to_502() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/my/recent/images"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = test_router(&server.uri())
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .header("x-api-token", VALID_TOKEN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["details"], "upstream returned status 500");
}

// ---------------------------------------------------------------------------
// GET /proxy/image
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proxy_without_url_returns_400() {
    let router = test_router("http://localhost:9");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/proxy/image")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing image URL");
}

#[tokio::test]
async fn proxy_with_empty_url_returns_400() {
    let router = test_router("http://localhost:9");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/proxy/image?url=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn proxy_relays_bytes_with_caching_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/a.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(b"png bytes".to_vec()),
        )
        .mount(&server)
        .await;

    let target = urlencoding::encode(&format!("{}/img/a.png", server.uri())).to_string();
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri(format!("/proxy/image?url={target}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=86400"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"png bytes");
}

#[tokio::test]
async fn proxy_defaults_content_type_to_jpeg() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw".to_vec()))
        .mount(&server)
        .await;

    let target = urlencoding::encode(&format!("{}/img/raw", server.uri())).to_string();
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri(format!("/proxy/image?url={target}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn proxy_maps_origin_error_to_502() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let target = urlencoding::encode(&format!("{}/gone.png", server.uri())).to_string();
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri(format!("/proxy/image?url={target}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("404"));
}

// ---------------------------------------------------------------------------
// System routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok_and_version() {
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"].get("/api/images").is_some());
    assert!(body["paths"].get("/proxy/image").is_some());
}

#[tokio::test]
async fn root_serves_the_page_document() {
    let response = test_router("http://localhost:9")
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8(bytes.to_vec()).unwrap().contains("<html"));
}

#[tokio::test]
async fn html_paths_fall_back_to_the_page_document() {
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri("/anything.html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_return_json_404() {
    let response = test_router("http://localhost:9")
        .oneshot(
            Request::builder()
                .uri("/nope/nothing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn custom_static_dir_is_served_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("index.html"), "<html>custom page</html>")
        .await
        .unwrap();

    let config = Config {
        server: crate::config::ServerConfig {
            static_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        },
        ..Default::default()
    };
    let router = super::create_router(Arc::new(config));

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8(bytes.to_vec())
        .unwrap()
        .contains("custom page"));
}
