use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{CompletionClient, MediaAttachment};
use crate::AnalysisError;

fn completion_body(text: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": text}}]
    })
}

#[tokio::test]
async fn complete_returns_response_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer key-1"))
        .and(body_partial_json(json!({"model": "vision-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  analysis  ")))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), "key-1", "vision-model", 30);
    let media = vec![MediaAttachment::image("aGVsbG8=".to_owned())];
    let text = client.complete("analyze this", &media).await.unwrap();
    assert_eq!(text, "analysis");
}

#[tokio::test]
async fn attachments_are_sent_as_data_urls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), "key-1", "vision-model", 30);
    let media = vec![
        MediaAttachment::image("aW1n".to_owned()),
        MediaAttachment::video("dmlk".to_owned()),
    ];
    client.complete("analyze this", &media).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let content = body["messages"][0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 3);
    assert_eq!(content[0]["type"], "text");
    assert_eq!(
        content[1]["image_url"]["url"],
        "data:image/jpeg;base64,aW1n"
    );
    assert_eq!(content[2]["image_url"]["url"], "data:video/mp4;base64,dmlk");
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), "key-1", "vision-model", 30);
    let text = client.complete("analyze this", &[]).await.unwrap();
    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn client_error_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), "key-1", "vision-model", 30);
    let err = client.complete("analyze this", &[]).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Api { status: 400, ref message } if message == "bad request"
    ));
}

#[tokio::test]
async fn empty_choices_are_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), "key-1", "vision-model", 30);
    let err = client.complete("analyze this", &[]).await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse { .. }));
}
