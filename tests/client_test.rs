//! OneView client tests
//!
//! These tests use mockito to simulate OneView API responses

use mockito::{Matcher, Server, ServerGuard};
use oneview_exporter::client::OneViewClient;
use oneview_exporter::collectors::{CollectionContext, Collector, CountCollector};
use oneview_exporter::config::OneViewConfig;
use oneview_exporter::error::OneViewError;
use oneview_exporter::inventory::{HealthStatus, InventoryClient, ResourceKind};
use oneview_exporter::metrics::ExporterMetrics;
use std::sync::Arc;
use std::time::Duration;

/// Helper to create a test OneView config pointing to mock server
fn create_test_config(server_url: &str) -> OneViewConfig {
    OneViewConfig {
        endpoint: server_url.to_string(),
        username: "Administrator".to_string(),
        password: "test-secret".to_string(),
        auth_login_domain: "LOCAL".to_string(),
        verify_tls: false,
        api_version: 800,
        if_match: "*".to_string(),
        timeout_seconds: 5,
    }
}

async fn mock_login(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/rest/login-sessions")
        .match_header("x-api-version", "800")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "userName": "Administrator",
            "password": "test-secret",
            "authLoginDomain": "LOCAL"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sessionID": "session-token-1", "partnerData": {}}"#)
        .create_async()
        .await
}

#[tokio::test]
async fn test_login_success() {
    let mut server = Server::new_async().await;
    let login = mock_login(&mut server).await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    client.login().await.unwrap();

    login.assert_async().await;
}

#[tokio::test]
async fn test_login_rejected() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/rest/login-sessions")
        .with_status(400)
        .with_body(r#"{"errorCode": "AUTHN_AUTH_FAIL"}"#)
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let result = client.login().await;

    assert!(matches!(result, Err(OneViewError::Auth(_))));
}

#[tokio::test]
async fn test_list_enclosures_sends_session_headers() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let mock = server
        .mock("GET", "/rest/enclosures")
        .match_header("auth", "session-token-1")
        .match_header("x-api-version", "800")
        .match_header("if-match", "*")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "type": "EnclosureListV7",
            "category": "enclosures",
            "total": 3,
            "count": 3,
            "start": 0,
            "nextPageUri": null,
            "members": [
                {"uuid": "0000A66101", "name": "Encl1", "uri": "/rest/enclosures/0000A66101", "status": "OK"},
                {"uuid": "0000A66102", "name": "Encl2", "uri": "/rest/enclosures/0000A66102", "status": "OK"},
                {"uuid": "0000A66103", "name": "Encl3", "uri": "/rest/enclosures/0000A66103", "status": "Warning"}
            ]
        }"#,
        )
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    client.login().await.unwrap();

    let list = client
        .list_resources(ResourceKind::Enclosures, None)
        .await
        .unwrap();

    assert_eq!(list.total, 3);
    assert_eq!(list.category, "enclosures");
    assert_eq!(list.members.len(), 3);
    assert_eq!(list.members[0].uuid, "0000A66101");
    assert_eq!(list.members[2].uri, "/rest/enclosures/0000A66103");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_with_status_filter() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let mock = server
        .mock("GET", "/rest/server-hardware")
        .match_query(Matcher::UrlEncoded(
            "filter".into(),
            "'status'='Critical'".into(),
        ))
        .with_status(200)
        .with_body(r#"{"category": "server-hardware", "total": 2, "members": []}"#)
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let list = client
        .list_resources(ResourceKind::ServerHardware, Some(HealthStatus::Critical))
        .await
        .unwrap();

    assert_eq!(list.total, 2);
    assert_eq!(list.category, "server-hardware");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_follows_next_page() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let _first = server
        .mock("GET", "/rest/server-hardware")
        .with_status(200)
        .with_body(
            r#"{
            "category": "server-hardware",
            "total": 2,
            "nextPageUri": "/rest/server-hardware?start=1&count=1",
            "members": [{"uuid": "srv-1", "name": "Encl1, bay 1", "uri": "/rest/server-hardware/srv-1"}]
        }"#,
        )
        .create_async()
        .await;

    let second = server
        .mock("GET", "/rest/server-hardware")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "1".into()),
            Matcher::UrlEncoded("count".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
            "category": "server-hardware",
            "total": 2,
            "nextPageUri": null,
            "members": [{"uuid": "srv-2", "name": "Encl1, bay 2", "uri": "/rest/server-hardware/srv-2"}]
        }"#,
        )
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let list = client
        .list_resources(ResourceKind::ServerHardware, None)
        .await
        .unwrap();

    assert_eq!(list.total, 2);
    let uuids: Vec<_> = list.members.iter().map(|m| m.uuid.as_str()).collect();
    assert_eq!(uuids, vec!["srv-1", "srv-2"]);
    second.assert_async().await;
}

const PAGED_ENCLOSURES: &str = r#"{
    "category": "enclosures",
    "total": 3,
    "nextPageUri": "/rest/enclosures?start=1&count=1",
    "members": [{"uuid": "0000A66101", "name": "Encl1", "uri": "/rest/enclosures/0000A66101"}]
}"#;

async fn mock_broken_second_page(
    server: &mut ServerGuard,
    second_page_hits: usize,
) -> (mockito::Mock, mockito::Mock) {
    let first = server
        .mock("GET", "/rest/enclosures")
        .with_status(200)
        .with_body(PAGED_ENCLOSURES)
        .create_async()
        .await;

    let second = server
        .mock("GET", "/rest/enclosures")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "1".into()),
            Matcher::UrlEncoded("count".into(), "1".into()),
        ]))
        .with_status(500)
        .with_body(r#"{"errorCode": "INTERNAL_ERROR"}"#)
        .expect(second_page_hits)
        .create_async()
        .await;

    (first, second)
}

#[tokio::test]
async fn test_count_reads_only_first_page() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let (first, second) = mock_broken_second_page(&mut server, 0).await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let count = client
        .count_resources(ResourceKind::Enclosures, None)
        .await
        .unwrap();

    assert_eq!(count.total, 3);
    assert_eq!(count.category, "enclosures");
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_list_fails_when_later_page_fails() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let (_first, second) = mock_broken_second_page(&mut server, 1).await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let result = client.list_resources(ResourceKind::Enclosures, None).await;

    assert!(matches!(result, Err(OneViewError::Api(_))));
    second.assert_async().await;
}

#[tokio::test]
async fn test_count_collector_sets_total_despite_broken_second_page() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let _pages = mock_broken_second_page(&mut server, 0).await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let metrics = ExporterMetrics::new().unwrap();
    let ctx = CollectionContext::new(Arc::new(client), metrics.clone(), Duration::from_secs(5));

    // Only enclosures are mocked; the other kinds fail.
    let report = CountCollector::new(ctx, Duration::from_secs(60))
        .collect_once()
        .await;
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 3);

    let output = metrics.encode().unwrap();
    assert!(output.contains(r#"oneview_resource_count{resourceType="enclosures"} 3"#));
}

#[tokio::test]
async fn test_fetch_utilization_requests_refresh() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let mock = server
        .mock("GET", "/rest/enclosures/0000A66101/utilization")
        .match_query(Matcher::UrlEncoded("refresh".into(), "true".into()))
        .with_status(200)
        .with_body(
            r#"{
            "isFresh": true,
            "resolution": 300000,
            "metricList": [
                {"metricName": "AmbientTemperature", "metricSamples": [[1703635200000, 22.5]], "metricCapacity": null},
                {"metricName": "AveragePower", "metricSamples": [[1703635200000, 310.0]], "metricCapacity": 2500},
                {"metricName": "PeakPower", "metricSamples": [[1703635200000, 450.0]], "metricCapacity": 2500}
            ]
        }"#,
        )
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let utilization = client
        .fetch_utilization("/rest/enclosures/0000A66101")
        .await
        .unwrap();

    assert!(utilization.is_fresh);
    assert_eq!(utilization.metric_list.len(), 3);
    assert_eq!(utilization.latest("Encl1", "AveragePower").unwrap(), 310.0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_handling() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let mock = server
        .mock("GET", "/rest/interconnects")
        .with_status(500)
        .with_body(r#"{"errorCode": "INTERNAL_ERROR"}"#)
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let result = client
        .list_resources(ResourceKind::Interconnects, None)
        .await;

    assert!(matches!(result, Err(OneViewError::Api(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let _mock = server
        .mock("GET", "/rest/sas-interconnects")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    let result = client
        .list_resources(ResourceKind::SasInterconnects, None)
        .await;

    assert!(matches!(result, Err(OneViewError::ParseError(_))));
}

#[tokio::test]
async fn test_unauthorized_forces_relogin() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/rest/login-sessions")
        .with_status(200)
        .with_body(r#"{"sessionID": "session-token-1"}"#)
        .expect(2)
        .create_async()
        .await;

    let rejected = server
        .mock("GET", "/rest/enclosures")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let client = OneViewClient::new(create_test_config(&server.url())).unwrap();
    client.login().await.unwrap();

    let result = client.list_resources(ResourceKind::Enclosures, None).await;
    assert!(matches!(result, Err(OneViewError::Auth(_))));
    rejected.assert_async().await;
    rejected.remove_async().await;

    let _accepted = server
        .mock("GET", "/rest/enclosures")
        .with_status(200)
        .with_body(r#"{"category": "enclosures", "total": 1, "members": []}"#)
        .create_async()
        .await;

    let list = client
        .list_resources(ResourceKind::Enclosures, None)
        .await
        .unwrap();
    assert_eq!(list.total, 1);
    login.assert_async().await;
}
