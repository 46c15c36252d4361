//! Tests for the upstream HTTP client against a mock server.

use std::collections::BTreeMap;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statgate_mcp::client::{HttpStatClient, StatClient};
use statgate_mcp::config::Config;
use statgate_mcp::endpoints::EndpointAllowlist;
use statgate_mcp::gateway::{Gateway, QueryRequest};
use statgate_mcp::pagination::PaginationRequest;
use statgate_mcp::StatGateError;

const ENDPOINT: &str = "api/v1/schools/ccd/directory/2022";

fn client_for(server: &MockServer) -> HttpStatClient {
    HttpStatClient::new(&Config::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_fetch_chunk_sends_page_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{ENDPOINT}/")))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10000"))
        .and(query_param("fips", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 12345,
            "next": null,
            "previous": null,
            "results": [{"ncessch": "060001", "school_name": "A"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut filters = BTreeMap::new();
    filters.insert("fips".to_string(), "6".to_string());
    let chunk = client_for(&server)
        .fetch_chunk(ENDPOINT, &filters, 2, 10_000)
        .await
        .unwrap();
    assert_eq!(chunk.total(), 12345);
    assert_eq!(chunk.results.len(), 1);
}

#[tokio::test]
async fn test_fetch_chunk_without_count_uses_result_length() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{ENDPOINT}/")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [{"a": 1}, {"a": 2}]})),
        )
        .mount(&server)
        .await;

    let chunk = client_for(&server)
        .fetch_chunk(ENDPOINT, &BTreeMap::new(), 1, 10_000)
        .await
        .unwrap();
    assert_eq!(chunk.total(), 2);
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpStatClient::new(&Config::new(server.uri()).with_token("secret")).unwrap();
    client
        .fetch_chunk(ENDPOINT, &BTreeMap::new(), 1, 10_000)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_status_mapping() {
    let server = MockServer::start().await;

    Mock::given(path("/unauthorized/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(path("/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/broken/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;
    Mock::given(path("/garbled/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let none = BTreeMap::new();

    assert!(matches!(
        client.fetch_chunk("unauthorized", &none, 1, 10).await,
        Err(StatGateError::Auth)
    ));
    assert!(matches!(
        client.fetch_chunk("missing", &none, 1, 10).await,
        Err(StatGateError::NotFound(_))
    ));
    match client.fetch_chunk("broken", &none, 1, 10).await {
        Err(StatGateError::Api(msg)) => {
            assert!(msg.contains("503"));
            assert!(msg.contains("upstream down"));
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
    assert!(matches!(
        client.fetch_chunk("garbled", &none, 1, 10).await,
        Err(StatGateError::Json(_))
    ));
}

#[tokio::test]
async fn test_upstream_error_passes_through_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config =
        Config::new(server.uri()).with_allowed_endpoints(EndpointAllowlist::new([ENDPOINT]));
    let gateway = Gateway::new(HttpStatClient::new(&config).unwrap(), &config);
    let result = gateway
        .query(&QueryRequest {
            endpoint: ENDPOINT.to_string(),
            pagination: PaginationRequest::from_ints(Some(1), None, Some(5)),
            ..Default::default()
        })
        .await;
    match result {
        Err(err @ StatGateError::Api(_)) => assert!(!err.is_client_error()),
        other => panic!("Expected Api error, got {other:?}"),
    }
}
