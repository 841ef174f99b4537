//! Integration tests for `RemoteClient` using wiremock HTTP mocks.

use pdvisit_core::{IdentifierCode, LookupMatch};
use pdvisit_remote::{RemoteClient, RemoteConfig, RemoteError, VisitRow};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RemoteClient {
    RemoteClient::new(RemoteConfig {
        base_url: base_url.to_string(),
        api_key: "test-key".to_string(),
        user_agent: "pdvisit-test/0.1".to_string(),
        visit_table: "visitas_pdv".to_string(),
        lookup_table: "tae".to_string(),
        lookup_key_column: "mdn".to_string(),
        lookup_name_column: "pdv".to_string(),
    })
    .expect("client construction should not fail")
}

fn code(raw: &str) -> IdentifierCode {
    IdentifierCode::parse(raw).expect("valid test identifier")
}

fn sample_row() -> VisitRow {
    VisitRow {
        route: "AJ01".to_string(),
        identifier: "88889999".to_string(),
        resolved_name: None,
        latitude: 9.93,
        longitude: -84.08,
        accuracy: 15.0,
        has_inventory: true,
        inventory_count: Some(15),
        left_inventory: false,
        left_inventory_count: None,
    }
}

#[tokio::test]
async fn lookup_name_returns_first_row_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tae"))
        .and(query_param("select", "pdv"))
        .and(query_param("mdn", "eq.88889999"))
        .and(query_param("limit", "1"))
        .and(header("apikey", "test-key"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "pdv": "Super Central" }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let name = client
        .lookup_name(&code("88889999"), LookupMatch::Exact)
        .await
        .expect("lookup should succeed");

    assert_eq!(name.as_deref(), Some("Super Central"));
}

#[tokio::test]
async fn lookup_name_returns_none_on_zero_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tae"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let name = client
        .lookup_name(&code("12345678"), LookupMatch::Exact)
        .await
        .expect("lookup should succeed");

    assert!(name.is_none());
}

#[tokio::test]
async fn lookup_name_treats_null_name_as_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tae"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "pdv": null }])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let name = client
        .lookup_name(&code("12345678"), LookupMatch::Exact)
        .await
        .expect("lookup should succeed");

    assert!(name.is_none());
}

#[tokio::test]
async fn lookup_name_uses_like_filter_in_pattern_mode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tae"))
        .and(query_param("mdn", "like.*88889999*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "pdv": "Pattern Hit" }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let name = client
        .lookup_name(&code("88889999"), LookupMatch::Pattern)
        .await
        .expect("lookup should succeed");

    assert_eq!(name.as_deref(), Some("Pattern Hit"));
}

#[tokio::test]
async fn lookup_name_surfaces_status_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tae"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API key" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .lookup_name(&code("88889999"), LookupMatch::Exact)
        .await
        .expect_err("401 should be an error");

    match err {
        RemoteError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn lookup_name_rejects_non_array_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tae"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .lookup_name(&code("88889999"), LookupMatch::Exact)
        .await
        .expect_err("html body should not parse");

    assert!(matches!(err, RemoteError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn insert_visit_posts_single_row_array() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/visitas_pdv"))
        .and(header("prefer", "return=minimal"))
        .and(header("apikey", "test-key"))
        .and(body_json(json!([{
            "agente_id": "AJ01",
            "pdv_id": "88889999",
            "nombre_pdv": null,
            "lat": 9.93,
            "lng": -84.08,
            "accuracy": 15.0,
            "tiene_chips": true,
            "cantidad_chips": 15,
            "se_entregaron": false,
            "cantidad_entregada": null
        }])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .insert_visit(&sample_row())
        .await
        .expect("insert should succeed");
}

#[tokio::test]
async fn insert_visit_surfaces_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/visitas_pdv"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "23502",
            "message": "null value in column \"agente_id\""
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .insert_visit(&sample_row())
        .await
        .expect_err("400 should be an error");

    assert!(
        matches!(err, RemoteError::Status { status: 400, .. }),
        "got {err:?}"
    );
    assert!(!err.is_transport());
}

#[tokio::test]
async fn probe_reads_exact_count_from_content_range() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/visitas_pdv"))
        .and(query_param("select", "count"))
        .and(header("prefer", "count=exact"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "*/42"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let count = client.probe().await.expect("probe should succeed");
    assert_eq!(count, Some(42));
}

#[tokio::test]
async fn probe_reports_status_failure() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/visitas_pdv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.probe().await.expect_err("404 should be an error");
    assert!(matches!(err, RemoteError::Status { status: 404, .. }));
}

#[tokio::test]
async fn probe_reports_transport_failure() {
    // Bind then drop a listener so the port refuses connections.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };

    let client = test_client(&format!("http://127.0.0.1:{port}"));
    let err = client.probe().await.expect_err("closed port should fail");
    assert!(err.is_transport(), "expected transport error, got {err:?}");
}
