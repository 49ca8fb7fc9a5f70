//! Provider client integration tests
//!
//! Each provider client is pointed at a wiremock server to verify its
//! field-name mapping, its not-found signal, and the retry wrapper's
//! classification of transient versus terminal failures.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ceplote_common::Cep;
use ceplote_server::providers::{
    lookup_with_retry, AwesomeApi, BrasilApi, CepProvider, ProviderError, RetryPolicy, ViaCep,
};

fn cep() -> Cep {
    Cep::normalize("01001000").expect("valid test CEP")
}

fn client() -> reqwest::Client {
    ceplote_server::providers::build_http_client(5).expect("client builds")
}

#[tokio::test]
async fn test_brasilapi_maps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01001000",
            "street": "Praça da Sé",
            "neighborhood": "Sé",
            "city": "São Paulo",
            "state": "SP"
        })))
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let address = provider.lookup(&cep()).await.expect("lookup succeeds");

    assert_eq!(address.street.as_deref(), Some("Praça da Sé"));
    assert_eq!(address.neighborhood.as_deref(), Some("Sé"));
    assert_eq!(address.city.as_deref(), Some("São Paulo"));
    assert_eq!(address.state.as_deref(), Some("SP"));
}

#[tokio::test]
async fn test_brasilapi_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let err = provider.lookup(&cep()).await.expect_err("must fail");

    assert_eq!(err, ProviderError::NotFound);
}

#[tokio::test]
async fn test_viacep_maps_portuguese_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP"
        })))
        .mount(&server)
        .await;

    let provider = ViaCep::new(client(), server.uri());
    let address = provider.lookup(&cep()).await.expect("lookup succeeds");

    assert_eq!(address.street.as_deref(), Some("Praça da Sé"));
    assert_eq!(address.neighborhood.as_deref(), Some("Sé"));
    assert_eq!(address.city.as_deref(), Some("São Paulo"));
    assert_eq!(address.state.as_deref(), Some("SP"));
}

#[tokio::test]
async fn test_viacep_success_shaped_failure_is_not_found() {
    // ViaCEP answers HTTP 200 with an embedded error marker for unknown
    // codes. That must come out as NotFound, never as a success.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": true })))
        .mount(&server)
        .await;

    let provider = ViaCep::new(client(), server.uri());
    let err = provider.lookup(&cep()).await.expect_err("must fail");

    assert_eq!(err, ProviderError::NotFound);
}

#[tokio::test]
async fn test_viacep_string_erro_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": "true" })),
        )
        .mount(&server)
        .await;

    let provider = ViaCep::new(client(), server.uri());
    let err = provider.lookup(&cep()).await.expect_err("must fail");

    assert_eq!(err, ProviderError::NotFound);
}

#[tokio::test]
async fn test_awesomeapi_maps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/01001000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01001000",
            "address": "Praça da Sé",
            "district": "Sé",
            "city": "São Paulo",
            "state": "SP"
        })))
        .mount(&server)
        .await;

    let provider = AwesomeApi::new(client(), server.uri());
    let address = provider.lookup(&cep()).await.expect("lookup succeeds");

    assert_eq!(address.street.as_deref(), Some("Praça da Sé"));
    assert_eq!(address.neighborhood.as_deref(), Some("Sé"));
    assert_eq!(address.city.as_deref(), Some("São Paulo"));
    assert_eq!(address.state.as_deref(), Some("SP"));
}

#[tokio::test]
async fn test_empty_fields_normalize_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cep": "01001000",
            "street": "",
            "neighborhood": "",
            "city": "São Paulo",
            "state": "SP"
        })))
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let address = provider.lookup(&cep()).await.expect("lookup succeeds");

    assert_eq!(address.street, None);
    assert_eq!(address.neighborhood, None);
    assert_eq!(address.city.as_deref(), Some("São Paulo"));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let err = provider.lookup(&cep()).await.expect_err("must fail");

    assert!(matches!(err, ProviderError::Unavailable(_)));
}

#[tokio::test]
async fn test_unparseable_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let err = provider.lookup(&cep()).await.expect_err("must fail");

    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn test_retry_recovers_from_transient_5xx() {
    let server = MockServer::start().await;

    // Two failures, then success. The retry wrapper must ride through.
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "street": "Praça da Sé",
            "neighborhood": "Sé",
            "city": "São Paulo",
            "state": "SP"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let policy = RetryPolicy::new(3, Duration::ZERO);

    let address = lookup_with_retry(&provider, &cep(), &policy)
        .await
        .expect("third attempt succeeds");
    assert_eq!(address.city.as_deref(), Some("São Paulo"));
}

#[tokio::test]
async fn test_retry_does_not_burn_attempts_on_not_found() {
    let server = MockServer::start().await;

    // Exactly one request: 404 short-circuits without consuming retries.
    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let policy = RetryPolicy::new(5, Duration::ZERO);

    let err = lookup_with_retry(&provider, &cep(), &policy)
        .await
        .expect_err("must fail");
    assert_eq!(err, ProviderError::NotFound);
}

#[tokio::test]
async fn test_retry_exhaustion_is_terminal_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cep/v2/01001000"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let provider = BrasilApi::new(client(), server.uri());
    let policy = RetryPolicy::new(3, Duration::ZERO);

    let err = lookup_with_retry(&provider, &cep(), &policy)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ProviderError::Unavailable(_)));
}
