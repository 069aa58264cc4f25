use idpull::error::Error;
use idpull::provider::Provider;
use idpull::spec::{self, fetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_returns_the_raw_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spec.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("paths: {}\n"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let raw = fetcher::fetch(&client, &format!("{}/spec.yaml", server.uri()))
        .await
        .unwrap();
    assert_eq!(raw, "paths: {}\n");
}

#[tokio::test]
async fn non_2xx_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spec.yaml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = fetcher::fetch(&client, &format!("{}/spec.yaml", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SpecFetch { .. }));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn unreachable_host_is_a_fetch_error_not_a_panic() {
    let client = reqwest::Client::new();
    // Nothing listens on port 1; the connection is refused immediately.
    let err = fetcher::fetch(&client, "http://127.0.0.1:1/spec.yaml")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SpecFetch { .. }));
}

#[tokio::test]
async fn load_endpoints_degrades_to_an_empty_table_on_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let (table, diagnostic) = spec::load_endpoints(
        &client,
        Provider::IdentityNow,
        Some(&format!("{}/spec.yaml", server.uri())),
    )
    .await;

    assert!(table.is_empty());
    assert!(diagnostic.unwrap().contains("500"));
}

#[tokio::test]
async fn load_endpoints_degrades_on_malformed_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("openapi: 3.0.0\n"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let (table, diagnostic) = spec::load_endpoints(
        &client,
        Provider::IdentityNow,
        Some(&format!("{}/spec.yaml", server.uri())),
    )
    .await;

    assert!(table.is_empty());
    assert!(diagnostic.unwrap().contains("paths"));
}

#[tokio::test]
async fn load_endpoints_parses_a_healthy_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("paths:\n  /users:\n    get:\n      summary: List users\n"),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let (table, diagnostic) = spec::load_endpoints(
        &client,
        Provider::IdentityNow,
        Some(&format!("{}/spec.yaml", server.uri())),
    )
    .await;

    assert!(diagnostic.is_none());
    assert_eq!(table.len(), 1);
    assert!(table.contains_key("/users"));
}
