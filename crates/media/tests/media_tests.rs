use std::time::Duration;

use httpmock::prelude::*;
use realty_config::MediaConfig;
use realty_media::{image_host, HttpImageHost, ImageHost, MediaError};
use serde_json::json;

const PAYLOAD: &str = "R0lGODlhAQABAAAAACw=";

fn host(server: &MockServer) -> HttpImageHost {
    HttpImageHost::new("test-key", &server.url("/1/upload"), Duration::from_secs(5))
        .expect("client builds")
}

#[tokio::test]
async fn upload_posts_form_and_returns_hosted_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/1/upload")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_contains("key=test-key")
                .body_contains("name=casa-joquei");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "success": true,
                    "status": 200,
                    "data": { "url": "https://i.ibb.co/xyz/casa-joquei.gif" }
                }));
        })
        .await;

    let hosted = host(&server)
        .upload(PAYLOAD, "casa-joquei")
        .await
        .expect("upload succeeds");

    mock.assert_async().await;
    assert_eq!(hosted.url, "https://i.ibb.co/xyz/casa-joquei.gif");
}

#[tokio::test]
async fn error_status_surfaces_host_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/1/upload");
            then.status(400).json_body(json!({
                "status_code": 400,
                "error": { "message": "Invalid API v1 key.", "code": 100 },
                "status_txt": "Bad Request"
            }));
        })
        .await;

    let error = host(&server).upload(PAYLOAD, "foto").await.unwrap_err();
    match error {
        MediaError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid API v1 key.");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unsuccessful_body_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/1/upload");
            then.status(200).json_body(json!({ "success": false }));
        })
        .await;

    let result = host(&server).upload(PAYLOAD, "foto").await;
    assert!(matches!(result, Err(MediaError::Rejected { status: 200, .. })));
}

#[tokio::test]
async fn garbage_body_is_a_response_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/1/upload");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let result = host(&server).upload(PAYLOAD, "foto").await;
    assert!(matches!(result, Err(MediaError::Response(_))));
}

#[tokio::test]
async fn configured_key_builds_http_host() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/upload").body_contains("key=from-config");
            then.status(200).json_body(json!({
                "success": true,
                "data": { "url": "https://i.ibb.co/a/b.png" }
            }));
        })
        .await;

    let config = MediaConfig {
        api_key: Some("from-config".into()),
        upload_url: server.url("/upload"),
        request_timeout_seconds: 5,
    };
    let host = image_host(&config).expect("host builds");
    let hosted = host.upload(PAYLOAD, "b").await.expect("upload succeeds");

    mock.assert_async().await;
    assert_eq!(hosted.url, "https://i.ibb.co/a/b.png");
}

#[tokio::test]
async fn blank_key_disables_uploads() {
    let config = MediaConfig {
        api_key: Some("   ".into()),
        ..MediaConfig::default()
    };
    let host = image_host(&config).expect("host builds");
    assert!(matches!(
        host.upload(PAYLOAD, "foto").await,
        Err(MediaError::NotConfigured)
    ));
}
