use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn test_client(server: &MockServer) -> SourceClient {
    SourceClient::new(&server.uri(), "test-token", 5, 0, 0)
        .expect("failed to build test SourceClient")
}

fn test_client_with_retries(server: &MockServer, max_retries: u32) -> SourceClient {
    SourceClient::new(&server.uri(), "test-token", 5, max_retries, 0)
        .expect("failed to build test SourceClient")
}

fn posts_path() -> String {
    format!("/acts/{PROFILE_ACTOR}/run-sync-get-dataset-items")
}

#[tokio::test]
async fn fetch_recent_parses_dataset_items() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .and(body_partial_json(json!({
            "directUrls": ["https://www.instagram.com/acme/"],
            "resultsType": "posts",
            "resultsLimit": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {"id": "p1", "type": "Image", "likesCount": 3},
            {"id": "p2", "type": "Video", "videoUrl": "https://v/2.mp4"}
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let posts = client.fetch_recent("acme", 2).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id.as_deref(), Some("p1"));
    assert_eq!(posts[0].likes_count, 3);
    assert_eq!(posts[1].item_type.as_deref(), Some("Video"));
}

#[tokio::test]
async fn fetch_recent_returns_empty_vec_for_empty_dataset() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let posts = client.fetch_recent("acme", 1).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn fetch_profile_returns_first_details_item() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .and(body_partial_json(json!({"resultsType": "details"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {"id": "777", "username": "acme", "followersCount": 1200, "hasChannel": true}
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let profile = client.fetch_profile("acme").await.unwrap();

    assert_eq!(profile.id.as_deref(), Some("777"));
    assert_eq!(profile.followers_count, 1200);
    assert!(profile.has_channel);
}

#[tokio::test]
async fn fetch_profile_empty_dataset_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_profile("acme").await;
    assert!(matches!(result, Err(ScraperError::EmptyRun { .. })));
}

#[tokio::test]
async fn fetch_hashtag_urls_skips_items_without_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/acts/{HASHTAG_ACTOR}/run-sync-get-dataset-items")))
        .and(body_partial_json(json!({"hashtags": ["coffee"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([
            {"url": "https://p/1"},
            {"caption": "no url here"},
            {"url": "https://p/2"}
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let urls = client.fetch_hashtag_urls("coffee", 10).await.unwrap();
    assert_eq!(urls, vec!["https://p/1".to_owned(), "https://p/2".to_owned()]);
}

#[tokio::test]
async fn fetch_details_by_urls_skips_request_for_empty_input() {
    let server = MockServer::start().await;
    // No mocks mounted: any request would 404 and fail the call.

    let client = test_client(&server);
    let posts = client.fetch_details_by_urls(&[]).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn rate_limit_reads_retry_after_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_recent("acme", 1).await;
    match result.unwrap_err() {
        ScraperError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn retries_after_429_and_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!([{"id": "p9"}])))
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 1);
    let posts = client.fetch_recent("acme", 1).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id.as_deref(), Some("p9"));
}

#[tokio::test]
async fn not_found_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 3);
    let result = client.fetch_recent("acme", 1).await;
    assert!(matches!(result, Err(ScraperError::NotFound { .. })));
}

#[tokio::test]
async fn unexpected_status_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 3);
    match client.fetch_recent("acme", 1).await.unwrap_err() {
        ScraperError::UnexpectedStatus { status, .. } => assert_eq!(status, 503),
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_dataset_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(posts_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.fetch_recent("acme", 1).await;
    assert!(matches!(result, Err(ScraperError::Deserialize { .. })));
}
