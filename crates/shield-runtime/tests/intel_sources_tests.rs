//! Intelligence lookups against mocked source APIs

use mockito::{Matcher, Server};
use shield_core::{Severity, TargetKind, Tier};
use shield_runtime::{
    IntelAuth, IntelClient, IntelInvestigator, IntelSource, InvestigationRequest, Investigator,
    RuntimeError,
};

fn source(name: &str, base_url: String, supports: Vec<TargetKind>) -> IntelSource {
    IntelSource {
        name: name.to_string(),
        base_url,
        path: "/lookup/{target}".to_string(),
        api_key: Some("secret".to_string()),
        auth: IntelAuth::Query {
            name: "key".to_string(),
        },
        supports,
        timeout_ms: 2_000,
        risk_pointer: Some("/risk".to_string()),
    }
}

#[tokio::test]
async fn test_lookup_sends_key_and_parses_json() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lookup/203.0.113.7")
        .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"risk": 75, "asn": "AS64500"}"#)
        .create_async()
        .await;

    let src = source("netrep", server.url(), vec![TargetKind::IpAddress]);
    let body = IntelClient::new().lookup(&src, "203.0.113.7").await.unwrap();

    assert_eq!(body["asn"], "AS64500");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bearer_and_header_auth() {
    let mut server = Server::new_async().await;
    let bearer = server
        .mock("GET", "/lookup/a")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let header = server
        .mock("GET", "/lookup/b")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = IntelClient::new();
    let mut src = source("s", server.url(), vec![TargetKind::Domain]);
    src.auth = IntelAuth::Bearer;
    client.lookup(&src, "a").await.unwrap();

    src.auth = IntelAuth::Header {
        name: "x-api-key".to_string(),
    };
    client.lookup(&src, "b").await.unwrap();

    bearer.assert_async().await;
    header.assert_async().await;
}

#[tokio::test]
async fn test_status_classification() {
    let mut server = Server::new_async().await;
    for (path, status) in [("/lookup/u", 401), ("/lookup/n", 404), ("/lookup/r", 429), ("/lookup/e", 502)] {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(status)
            .create_async()
            .await;
    }

    let client = IntelClient::new();
    let src = source("s", server.url(), vec![TargetKind::Domain]);

    assert!(matches!(client.lookup(&src, "u").await, Err(RuntimeError::Unauthorized(_))));
    assert!(matches!(client.lookup(&src, "n").await, Err(RuntimeError::NotFound(_))));
    assert!(matches!(client.lookup(&src, "r").await, Err(RuntimeError::RateLimited(_))));
    assert!(matches!(client.lookup(&src, "e").await, Err(RuntimeError::ExternalCallFailed(_))));
}

#[tokio::test]
async fn test_investigator_tolerates_partial_failure() {
    let mut good = Server::new_async().await;
    let mut bad = Server::new_async().await;
    good.mock("GET", "/lookup/203.0.113.7")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"risk": 80}"#)
        .create_async()
        .await;
    bad.mock("GET", "/lookup/203.0.113.7")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let investigator = IntelInvestigator::new(vec![
        source("good", good.url(), vec![TargetKind::IpAddress]),
        source("bad", bad.url(), vec![TargetKind::IpAddress]),
        source("domains-only", bad.url(), vec![TargetKind::Domain]),
    ]);
    let request = InvestigationRequest::preview("203.0.113.7", TargetKind::IpAddress, Tier::Standard);

    let result = investigator.investigate(&request).await.unwrap();
    assert_eq!(result.findings.len(), 2);
    assert!(result
        .findings
        .iter()
        .any(|f| f.source == "good" && f.severity == Severity::High));
    assert!(result.findings.iter().any(|f| f.category == "source_error"));
}

#[tokio::test]
async fn test_investigator_fails_when_every_source_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let investigator = IntelInvestigator::new(vec![source(
        "down",
        server.url(),
        vec![TargetKind::Domain],
    )]);
    let request = InvestigationRequest::preview("example.com", TargetKind::Domain, Tier::Basic);

    let err = investigator.investigate(&request).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoSources(_)));
}

#[tokio::test]
async fn test_no_applicable_source() {
    let investigator = IntelInvestigator::new(vec![IntelSource::preset("shodan", "k").unwrap()]);
    let request = InvestigationRequest::preview("Acme Ltd", TargetKind::Company, Tier::Basic);

    let err = investigator.investigate(&request).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoSources(_)));
}

#[tokio::test]
async fn test_url_target_queries_domain_source_by_host() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lookup/shop.example.com")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"risk": 45}"#)
        .create_async()
        .await;

    let investigator = IntelInvestigator::new(vec![source(
        "whois-like",
        server.url(),
        vec![TargetKind::Domain],
    )]);
    let request = InvestigationRequest::preview(
        "https://shop.example.com/checkout?step=2",
        TargetKind::Url,
        Tier::Basic,
    );

    let result = investigator.investigate(&request).await.unwrap();
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].severity, Severity::Medium);
    assert!(result.findings[0].summary.contains("shop.example.com"));
    mock.assert_async().await;
}
