use idpull::auth::AuthContext;
use idpull::engine::dispatcher::{dispatch, CallOutcome, Payload};
use idpull::engine::resolver::SelectionEntry;
use idpull::session::Session;
use idpull::spec::{HttpMethod, ParameterDecl, ParameterLocation};
use std::collections::HashMap;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn selection(endpoint: &str) -> SelectionEntry {
    SelectionEntry {
        endpoint: endpoint.to_string(),
        method: HttpMethod::Get,
        path_params: idpull::engine::resolver::extract_path_params(endpoint),
        query_params: vec![],
    }
}

fn query_decl(name: &str, required: bool) -> ParameterDecl {
    ParameterDecl {
        location: ParameterLocation::Query,
        name: name.to_string(),
        required,
        description: String::new(),
    }
}

fn ssws() -> AuthContext {
    AuthContext::Ssws {
        token: "test-token".to_string(),
    }
}

#[tokio::test]
async fn substitutes_path_params_and_applies_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/00u123"))
        .and(header("authorization", "SSWS test-token"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "00u123"})),
        )
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "Okta", None);
    let client = reqwest::Client::new();
    let mut auth = ssws();

    let selections = vec![selection("/api/v1/users/{userId}")];
    let mut values = HashMap::new();
    values.insert("userId".to_string(), "00u123".to_string());

    let result = dispatch(
        &client,
        &selections,
        &values,
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();

    assert_eq!(
        result.responses["/api/v1/users/{userId}"],
        CallOutcome::Success(Payload::Json(serde_json::json!({"id": "00u123"})))
    );
    assert!(result.archive_path.exists());
    assert_eq!(result.session_id, session.id());
}

#[tokio::test]
async fn missing_path_param_fails_locally_and_batch_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "Okta", None);
    let client = reqwest::Client::new();
    let mut auth = ssws();

    let selections = vec![
        selection("/api/v1/users/{userId}"),
        selection("/api/v1/groups"),
    ];
    let values = HashMap::new();

    let result = dispatch(
        &client,
        &selections,
        &values,
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();

    match &result.responses["/api/v1/users/{userId}"] {
        CallOutcome::Failure(message) => {
            assert!(message.contains("userId"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    // The second endpoint was still attempted and succeeded.
    assert_eq!(
        result.responses["/api/v1/groups"],
        CallOutcome::Success(Payload::Json(serde_json::json!([])))
    );
}

#[tokio::test]
async fn missing_required_query_param_fails_but_optionals_are_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "IdentityNow", None);
    let client = reqwest::Client::new();
    let mut auth = ssws();

    let mut required = selection("/accounts");
    required.query_params = vec![query_decl("filters", true)];
    let mut optional = selection("/accounts");
    optional.query_params = vec![query_decl("count", false)];

    let values = HashMap::new();
    let result = dispatch(
        &client,
        &[required],
        &values,
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();
    match &result.responses["/accounts"] {
        CallOutcome::Failure(message) => assert!(message.contains("filters")),
        other => panic!("expected failure, got {other:?}"),
    }

    let result = dispatch(
        &client,
        &[optional],
        &values,
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();
    assert!(matches!(
        result.responses["/accounts"],
        CallOutcome::Success(_)
    ));
}

#[tokio::test]
async fn supplied_query_values_reach_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .and(query_param("since", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "Okta", None);
    let client = reqwest::Client::new();
    let mut auth = ssws();

    let mut logs = selection("/logs");
    logs.query_params = vec![query_decl("since", false)];
    let mut values = HashMap::new();
    values.insert("since".to_string(), "2024-01-01".to_string());

    let result = dispatch(&client, &[logs], &values, &mut auth, &server.uri(), &session)
        .await
        .unwrap();
    assert!(matches!(
        result.responses["/logs"],
        CallOutcome::Success(_)
    ));
}

#[tokio::test]
async fn non_2xx_response_is_recorded_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "Okta", None);
    let client = reqwest::Client::new();
    let mut auth = ssws();

    let result = dispatch(
        &client,
        &[selection("/api/v1/users")],
        &HashMap::new(),
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();

    match &result.responses["/api/v1/users"] {
        CallOutcome::Failure(message) => {
            assert!(message.contains("403"));
            assert!(message.contains("forbidden"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_bodies_are_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "IIQ", None);
    let client = reqwest::Client::new();
    let mut auth = AuthContext::Basic {
        username: "spadmin".to_string(),
        password: "admin".to_string(),
    };

    let result = dispatch(
        &client,
        &[selection("/ping")],
        &HashMap::new(),
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();

    assert_eq!(
        result.responses["/ping"],
        CallOutcome::Success(Payload::Text("pong".to_string()))
    );
}

#[tokio::test]
async fn client_credentials_exchange_happens_once_per_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "exchanged-token",
                "token_type": "bearer"
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("authorization", "Bearer exchanged-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "IdentityNow", None);
    let client = reqwest::Client::new();
    let mut auth = AuthContext::client_credentials(
        "client_credentials".to_string(),
        "client-id".to_string(),
        "client-secret".to_string(),
    );

    // Two calls to the same endpoint; the token is exchanged once.
    let selections = vec![selection("/accounts"), selection("/accounts")];
    let result = dispatch(
        &client,
        &selections,
        &HashMap::new(),
        &mut auth,
        &server.uri(),
        &session,
    )
    .await
    .unwrap();

    assert!(matches!(
        result.responses["/accounts"],
        CallOutcome::Success(_)
    ));
}

#[tokio::test]
async fn base_url_without_scheme_is_normalized() {
    // No server here: the point is that dispatch records a transport
    // failure for an https URL built from a schemeless base, instead of
    // panicking on an unparseable URL.
    let temp = tempfile::tempdir().unwrap();
    let session = Session::new(temp.path(), "Okta", None);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();
    let mut auth = ssws();

    let result = dispatch(
        &client,
        &[selection("/users")],
        &HashMap::new(),
        &mut auth,
        "localhost:1",
        &session,
    )
    .await
    .unwrap();

    assert!(matches!(
        result.responses["/users"],
        CallOutcome::Failure(_)
    ));
}
