mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::*;
use roast_backend::config::AppConfig;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n fake png payload";

#[tokio::test]
async fn test_single_upload_returns_roast_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let upload_dir = config.upload_dir.clone();
    let describer = StubDescriber::ok();
    let roaster = StubRoaster::ok();
    let app = build_app(config, describer.clone(), roaster.clone(), None);

    let body = multipart_body(&[("image", Some("selfie.png"), "image/png", PNG_BYTES)]);
    let (status, json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", json);
    assert_eq!(json["ok"], true);
    let text = json["text"].as_str().unwrap();
    assert!(!text.is_empty());
    // The staged name keeps the original extension
    assert!(text.contains(".png"));

    assert_eq!(describer.calls(), 1);
    assert_eq!(roaster.calls(), 1);
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_non_file_parts_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let upload_dir = config.upload_dir.clone();
    let app = build_app(config, StubDescriber::ok(), StubRoaster::ok(), None);

    let body = multipart_body(&[
        ("note", None, "", "please be gentle".as_bytes()),
        ("image", Some("cat.jpeg"), "image/jpeg", PNG_BYTES),
        ("another-note", None, "", "actually don't".as_bytes()),
    ]);
    let (status, json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", json);
    assert!(json["text"].as_str().unwrap().contains(".jpeg"));
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_no_file_is_rejected_without_staging() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let upload_dir = config.upload_dir.clone();
    let describer = StubDescriber::ok();
    let app = build_app(config, describer.clone(), StubRoaster::ok(), None);

    let body = multipart_body(&[("note", None, "", "just text".as_bytes())]);
    let (status, json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No image file uploaded");
    assert_eq!(describer.calls(), 0);
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_multiple_files_are_rejected_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let upload_dir = config.upload_dir.clone();
    let describer = StubDescriber::ok();
    let app = build_app(config, describer.clone(), StubRoaster::ok(), None);

    let body = multipart_body(&[
        ("image", Some("one.png"), "image/png", PNG_BYTES),
        ("image", Some("two.png"), "image/png", PNG_BYTES),
        ("image", Some("three.png"), "image/png", PNG_BYTES),
    ]);
    let (status, json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Only one image can be uploaded at a time");
    assert_eq!(describer.calls(), 0);
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_describe_failure_returns_generic_500_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let upload_dir = config.upload_dir.clone();
    let roaster = StubRoaster::ok();
    let app = build_app(config, StubDescriber::failing(), roaster.clone(), None);

    let body = multipart_body(&[("image", Some("dog.webp"), "image/webp", PNG_BYTES)]);
    let (status, json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal Server Error");
    assert!(!json.to_string().contains("provider secret detail"));
    assert_eq!(roaster.calls(), 0);
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_generation_failure_returns_500_and_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let upload_dir = config.upload_dir.clone();
    let describer = StubDescriber::ok();
    let app = build_app(config, describer.clone(), StubRoaster::failing(), None);

    let body = multipart_body(&[("image", Some("car.gif"), "image/gif", PNG_BYTES)]);
    let (status, json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal Server Error");
    assert!(json.get("text").is_none());
    assert_eq!(describer.calls(), 1);
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        max_upload_size: 1024,
        ..test_config(dir.path())
    };
    let upload_dir = config.upload_dir.clone();
    let describer = StubDescriber::ok();
    let app = build_app(config, describer.clone(), StubRoaster::ok(), None);

    let big = vec![0xAB_u8; 8 * 1024];
    let body = multipart_body(&[("image", Some("huge.png"), "image/png", big.as_slice())]);
    let (status, _json) = send(&app, upload_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(describer.calls(), 0);
    assert!(staged_entries(&upload_dir).is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(
        test_config(dir.path()),
        StubDescriber::ok(),
        StubRoaster::ok(),
        None,
    );

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"image": "nope"}"#))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_concurrent_uploads_do_not_interfere() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_rate_limit: 100,
        ..test_config(dir.path())
    };
    let upload_dir = config.upload_dir.clone();
    let app = build_app(config, StubDescriber::ok(), StubRoaster::ok(), None);

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let name = format!("photo-{}.png", i);
            let body = multipart_body(&[("image", Some(name.as_str()), "image/png", PNG_BYTES)]);
            send(&app, upload_request(body)).await
        }));
    }

    for handle in handles {
        let (status, json) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "unexpected body: {}", json);
    }
    assert!(staged_entries(&upload_dir).is_empty());
}
