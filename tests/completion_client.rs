mod common;

use chatrelay::connectors::{
    CompletionConnector, CompletionServiceConfig, ConnectorError, OpenAiCompletionClient,
};
use chatrelay::models::MessageContent;
use futures::StreamExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiCompletionClient {
    OpenAiCompletionClient::new(CompletionServiceConfig {
        base_url: format!("{}/v1", server.uri()),
        connect_timeout_secs: 2,
        api_key: Some("test-key".into()),
    })
    .expect("client builds")
}

#[tokio::test]
async fn streams_fragments_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("\"stream\":true"))
        .and(body_string_contains("\"model\":\"gpt-4o\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(common::sse_body(&["Hi", "", " there!"]).into_bytes(), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stream = client(&server)
        .stream_completion(vec![MessageContent::user("Hello there")], "gpt-4o")
        .await
        .expect("stream opens");
    let fragments: Vec<String> = stream.map(|item| item.unwrap()).collect().await;

    assert_eq!(fragments, vec!["Hi", " there!"]);
}

#[tokio::test]
async fn provider_statuses_are_classified() {
    let cases = [
        (401, "unauthorized"),
        (429, "rate_limited"),
        (503, "unavailable"),
        (400, "http"),
    ];

    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = match client(&server)
            .stream_completion(vec![MessageContent::user("hi")], "gpt-4o")
            .await
        {
            Ok(_) => panic!("status {} should fail to open", status),
            Err(err) => err,
        };
        let matched = match (kind, &err) {
            ("unauthorized", ConnectorError::Unauthorized(_)) => true,
            ("rate_limited", ConnectorError::RateLimited(_)) => true,
            ("unavailable", ConnectorError::ServiceUnavailable(_)) => true,
            ("http", ConnectorError::HttpError(_)) => true,
            _ => false,
        };
        assert!(matched, "status {} mapped to {:?}", status, err);
    }
}

#[tokio::test]
async fn malformed_chunk_fails_the_stream_after_prior_fragments() {
    let server = MockServer::start().await;
    let body = format!("{}data: {{broken\n\n", &common::sse_body(&["ok"]).replace("data: [DONE]\n\n", ""));
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream"))
        .mount(&server)
        .await;

    let items: Vec<_> = client(&server)
        .stream_completion(vec![MessageContent::user("hi")], "gpt-4o")
        .await
        .expect("stream opens")
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "ok");
    assert!(matches!(items[1], Err(ConnectorError::InvalidResponse(_))));
}

#[tokio::test]
async fn unreachable_provider_fails_to_open() {
    let client = OpenAiCompletionClient::new(CompletionServiceConfig {
        base_url: "http://127.0.0.1:1/v1".into(),
        connect_timeout_secs: 1,
        api_key: None,
    })
    .unwrap();

    let result = client
        .stream_completion(vec![MessageContent::user("hi")], "gpt-4o")
        .await;
    assert!(matches!(result, Err(ConnectorError::ServiceUnavailable(_))));
}
