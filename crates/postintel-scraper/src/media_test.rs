use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn materializer_with_ceiling(video_max_bytes: usize) -> MediaMaterializer {
    MediaMaterializer::new(5, 5, video_max_bytes).expect("failed to build test MediaMaterializer")
}

#[tokio::test]
async fn image_fetch_returns_base64_payload() {
    let server = MockServer::start().await;
    let body: &[u8] = b"fake-jpeg-bytes";

    Mock::given(method("GET"))
        .and(path("/img.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let materializer = materializer_with_ceiling(MAX_VIDEO_BYTES);
    let blob = materializer
        .materialize(&format!("{}/img.jpg", server.uri()), MediaKind::Image)
        .await;

    assert_eq!(blob, MediaBlob::Available(BASE64.encode(body)));
}

#[tokio::test]
async fn image_non_2xx_yields_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let materializer = materializer_with_ceiling(MAX_VIDEO_BYTES);
    let blob = materializer
        .materialize(&format!("{}/gone.jpg", server.uri()), MediaKind::Image)
        .await;

    assert_eq!(blob, MediaBlob::Unavailable);
}

#[tokio::test]
async fn network_failure_yields_unavailable() {
    // Connecting to a freshly dropped server fails at the socket level.
    let server = MockServer::start().await;
    let url = format!("{}/img.jpg", server.uri());
    drop(server);

    let materializer = materializer_with_ceiling(MAX_VIDEO_BYTES);
    let blob = materializer.materialize(&url, MediaKind::Image).await;

    assert_eq!(blob, MediaBlob::Unavailable);
}

#[tokio::test]
async fn video_under_ceiling_is_materialized() {
    let server = MockServer::start().await;
    let body = vec![7u8; 1024];

    Mock::given(method("GET"))
        .and(path("/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let materializer = materializer_with_ceiling(4096);
    let blob = materializer
        .materialize(&format!("{}/clip.mp4", server.uri()), MediaKind::Video)
        .await;

    assert_eq!(blob, MediaBlob::Available(BASE64.encode(&body)));
}

#[tokio::test]
async fn video_over_ceiling_is_discarded_entirely() {
    let server = MockServer::start().await;
    let body = vec![7u8; 4096];

    Mock::given(method("GET"))
        .and(path("/big.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    // Ceiling below the payload size: no truncated blob may survive.
    let materializer = materializer_with_ceiling(1024);
    let blob = materializer
        .materialize(&format!("{}/big.mp4", server.uri()), MediaKind::Video)
        .await;

    assert_eq!(blob, MediaBlob::Unavailable);
}

#[tokio::test]
async fn video_exactly_at_ceiling_is_kept() {
    let server = MockServer::start().await;
    let body = vec![1u8; 1024];

    Mock::given(method("GET"))
        .and(path("/edge.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let materializer = materializer_with_ceiling(1024);
    let blob = materializer
        .materialize(&format!("{}/edge.mp4", server.uri()), MediaKind::Video)
        .await;

    assert_eq!(blob, MediaBlob::Available(BASE64.encode(&body)));
}
