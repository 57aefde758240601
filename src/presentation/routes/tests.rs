use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::app::AppState;
use crate::infrastructure::config::AppConfig;
use crate::test_support::{theme_zip, unique_temp_root};

use super::build_router;

const BOUNDARY: &str = "theme-admin-test-boundary";

async fn setup_router() -> (Router, Arc<AppState>) {
    let mut config = AppConfig::default();
    config.data_root = unique_temp_root("routes");
    config.themes.default_theme = None;
    config.catalog.base_url = None;

    let state = Arc::new(AppState::new(config).await.expect("build app state"));
    (build_router(state.clone()), state)
}

fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/zip\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(field: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/themes/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, "theme.zip", bytes)))
        .expect("build upload request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route request");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, body.to_vec())
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    let value = serde_json::from_slice(&body).expect("json body");
    (status, value)
}

#[tokio::test]
async fn upload_installs_theme_and_lists_it() {
    let (router, state) = setup_router().await;

    let (status, body) = send_json(&router, upload_request("file", &theme_zip("Aurora"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["success"]));

    let (status, body) = send_json(&router, empty_request(Method::GET, "/themes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["themes"][0]["name"], "Aurora");
    assert!(body["current"].is_null());

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}

#[tokio::test]
async fn upload_errors_are_reported_as_json() {
    let (router, state) = setup_router().await;

    let (status, body) = send_json(&router, upload_request("file", b"not a zip")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_json(&router, upload_request("other", &theme_zip("Nope"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("file"));

    let (status, _) = send(&router, upload_request("file", &theme_zip("Twin"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send_json(&router, upload_request("file", &theme_zip("Twin"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("Twin"));

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}

#[tokio::test]
async fn delete_redirects_to_listing() {
    let (router, state) = setup_router().await;
    send(&router, upload_request("file", &theme_zip("Doomed"))).await;

    let response = router
        .clone()
        .oneshot(empty_request(Method::DELETE, "/themes/Doomed"))
        .await
        .expect("route request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/themes")
    );

    let (status, body) = send_json(&router, empty_request(Method::DELETE, "/themes/Doomed")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}

#[tokio::test]
async fn active_theme_can_be_switched() {
    let (router, state) = setup_router().await;
    for name in ["Alpha", "Beta"] {
        send(&router, upload_request("file", &theme_zip(name))).await;
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/themes/active")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"theme":"Beta"}"#))
        .expect("build request");
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&router, empty_request(Method::GET, "/themes")).await;
    assert_eq!(body["current"]["name"], "Beta");
    assert_eq!(body["themes"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["themes"][0]["name"], "Alpha");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/themes/active")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"theme":"Ghost"}"#))
        .expect("build request");
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}

#[tokio::test]
async fn screenshot_status_reflects_theme_and_image_presence() {
    let (router, state) = setup_router().await;
    send(&router, upload_request("file", &theme_zip("Plain"))).await;

    let (status, body) = send(&router, empty_request(Method::GET, "/themes/Plain/screenshot")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&router, empty_request(Method::GET, "/themes/Ghost/screenshot")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        empty_request(Method::GET, "/themes/Plain/screenshot?width=0"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}

#[tokio::test]
async fn catalog_routes_fail_with_bad_gateway_when_unconfigured() {
    let (router, state) = setup_router().await;

    let (status, body) = send_json(
        &router,
        empty_request(Method::POST, "/themes/download/aurora"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());

    let (status, _) = send(&router, empty_request(Method::GET, "/catalog/themes?page=2")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}

#[tokio::test]
async fn themes_named_like_actions_stay_addressable() {
    let (router, state) = setup_router().await;

    for name in ["upload", "active", "download"] {
        let (status, _) = send(&router, upload_request("file", &theme_zip(name))).await;
        assert_eq!(status, StatusCode::OK, "install {}", name);

        let (status, _) = send(
            &router,
            empty_request(Method::GET, &format!("/themes/{}/screenshot", name)),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT, "screenshot of {}", name);

        let (status, _) = send(&router, empty_request(Method::DELETE, &format!("/themes/{}", name))).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "delete {}", name);
        assert!(!state.data_directory.themes().join(name).exists());
    }

    let (status, body) = send_json(&router, empty_request(Method::POST, "/themes/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let _ = tokio::fs::remove_dir_all(state.data_directory.root()).await;
}
