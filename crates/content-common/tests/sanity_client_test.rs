use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use content_common::sanity::{SanityClient, SanityClientConfig, SanityClientError};

fn test_config(server: &MockServer) -> SanityClientConfig {
    let mut config = SanityClientConfig::new("testproj", "production", "2023-06-06");
    config.base_url = Some(server.base_url());
    config.max_retries = 2;
    config.initial_backoff = Duration::from_millis(1);
    config.max_backoff = Duration::from_millis(5);
    config
}

#[tokio::test]
async fn fetch_decodes_result_envelope() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2023-06-06/data/query/production")
                .query_param("query", "*[_type == \"faq\"]{question}");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "ms": 3,
                    "result": [{"question": "What is GROQ"}, {"question": "Why slugs"}]
                }));
        })
        .await;

    let client = SanityClient::new(test_config(&server)).unwrap();
    let result: Vec<serde_json::Value> = client
        .fetch("*[_type == \"faq\"]{question}", &[])
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["question"], "What is GROQ");
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn point_lookup_miss_yields_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v2023-06-06/data/query/production");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ms": 1, "result": null}));
        })
        .await;

    let client = SanityClient::new(test_config(&server)).unwrap();
    let result: Option<serde_json::Value> = client
        .fetch("*[_type == \"faq\" && slug.current == $slug][0]", &[])
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn groq_params_are_json_encoded_on_the_wire() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v2023-06-06/data/query/production")
                .query_param("$slug", "\"diet-soda\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ms": 1, "result": null}));
        })
        .await;

    let client = SanityClient::new(test_config(&server)).unwrap();
    let _: Option<serde_json::Value> = client
        .fetch(
            "*[_type == \"faq\" && slug.current == $slug][0]",
            &[("slug", json!("diet-soda"))],
        )
        .await
        .unwrap();

    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn query_error_envelope_is_surfaced_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v2023-06-06/data/query/production");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "error": {"description": "expected ']' following expression", "type": "queryParseError"}
                }));
        })
        .await;

    let client = SanityClient::new(test_config(&server)).unwrap();
    let result: Result<Option<serde_json::Value>, _> = client.fetch("*[broken", &[]).await;

    match result {
        Err(SanityClientError::Upstream { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(message.contains("expected"));
        }
        other => panic!("expected Upstream error, got {other:?}"),
    }
    // 4xx is not transient, so exactly one attempt
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn server_errors_are_retried_until_attempts_run_out() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v2023-06-06/data/query/production");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let client = SanityClient::new(test_config(&server)).unwrap();
    let result: Result<Option<serde_json::Value>, _> =
        client.fetch("*[_type == \"faq\"]", &[]).await;

    assert!(result.is_err());
    // initial attempt + max_retries
    assert_eq!(mock.hits_async().await, 3);
}
