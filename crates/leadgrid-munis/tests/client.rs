//! Integration tests for `MunisClient` using wiremock HTTP mocks.

use std::time::Duration;

use leadgrid_munis::{MunisClient, MunisError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn municipios_body() -> serde_json::Value {
    serde_json::json!([
        { "id": 3548500, "nome": "Santos" },
        { "id": 3509502, "nome": "Campinas" },
        { "id": 3503208, "nome": "Araraquara" },
    ])
}

#[tokio::test]
async fn list_cities_returns_sorted_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/estados/SP/municipios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(municipios_body()))
        .mount(&server)
        .await;

    let client = MunisClient::with_base_url(30, &server.uri()).expect("client");
    let cities = client.list_cities("sp").await.expect("should list cities");

    assert_eq!(cities, vec!["Araraquara", "Campinas", "Santos"]);
}

#[tokio::test]
async fn list_cities_serves_repeat_calls_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/estados/SP/municipios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(municipios_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = MunisClient::with_base_url(30, &server.uri()).expect("client");
    let first = client.list_cities("SP").await.expect("first call");
    let second = client.list_cities("SP").await.expect("second call");

    assert_eq!(first, second);
    // The mock's expect(1) verifies on drop that only one request was made.
}

#[tokio::test]
async fn list_cities_refetches_after_ttl_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/estados/SP/municipios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(municipios_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = MunisClient::with_base_url(30, &server.uri())
        .expect("client")
        .cache_ttl(Duration::ZERO);
    client.list_cities("SP").await.expect("first call");
    client.list_cities("SP").await.expect("second call");
}

#[tokio::test]
async fn list_cities_rejects_invalid_uf_without_calling_upstream() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and fail the Http path instead.
    let client = MunisClient::with_base_url(30, &server.uri()).expect("client");

    let err = client.list_cities("S4O").await.expect_err("invalid UF");
    assert!(matches!(err, MunisError::InvalidUf(_)));
}

#[tokio::test]
async fn list_cities_maps_upstream_failure_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/estados/SP/municipios"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = MunisClient::with_base_url(30, &server.uri()).expect("client");
    let err = client.list_cities("SP").await.expect_err("500 must fail");
    assert!(matches!(err, MunisError::Http(_)));
}
