// crates/voting-harness/src/platform/tests.rs
// ============================================================================
// Module: Platform Client Tests
// Description: Unit tests for service addressing and href resolution.
// Purpose: Pin `{base}/{id}` construction and link joining rules.
// Dependencies: tiny_http, tokio
// ============================================================================

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::thread;
use std::time::Duration;

use tiny_http::Response;
use tiny_http::Server;
use url::Url;
use voting_contract::ResourceKind;
use voting_contract::Voter;
use voting_contract::VoterId;

use super::Platform;
use super::ResourceClient;
use crate::config::ServiceEndpoints;
use crate::requester::RequestError;
use crate::requester::Requester;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn client(base: &str) -> ResourceClient {
    ResourceClient::new(
        ResourceKind::Voter,
        Url::parse(base).unwrap(),
        Requester::new(Duration::from_secs(5)).unwrap(),
    )
}

// ============================================================================
// SECTION: Addressing
// ============================================================================

#[test]
fn item_url_appends_id_segment() {
    let client = client("http://localhost:1081/voters");
    assert_eq!(client.item_url("12").unwrap().as_str(), "http://localhost:1081/voters/12");
}

#[test]
fn item_url_tolerates_trailing_slash() {
    let client = client("http://localhost:1081/voters/");
    assert_eq!(client.item_url("12").unwrap().as_str(), "http://localhost:1081/voters/12");
    assert_eq!(client.item_url("health").unwrap().as_str(), "http://localhost:1081/voters/health");
}

#[test]
fn resolve_uses_absolute_hrefs_verbatim() {
    let client = client("http://localhost:1080/votes");
    let url = client.resolve("http://localhost:1082/polls/4/results").unwrap();
    assert_eq!(url.as_str(), "http://localhost:1082/polls/4/results");
}

#[test]
fn resolve_joins_root_relative_hrefs_onto_service_host() {
    let client = client("http://localhost:1080/votes");
    let url = client.resolve("/voters/9").unwrap();
    assert_eq!(url.as_str(), "http://localhost:1080/voters/9");
}

#[test]
fn resolve_rejects_empty_href() {
    let client = client("http://localhost:1080/votes");
    let err = client.resolve("  ").unwrap_err();
    assert!(matches!(err, RequestError::InvalidUrl { .. }));
}

#[test]
fn platform_routes_kinds_to_their_endpoints() {
    let endpoints = ServiceEndpoints::local_defaults().unwrap();
    let platform = Platform::new(&endpoints, Requester::new(Duration::from_secs(1)).unwrap());
    for kind in ResourceKind::ALL {
        assert_eq!(platform.client(kind).kind(), kind);
        assert_eq!(platform.client(kind).base(), endpoints.for_kind(kind));
    }
    assert_eq!(platform.polls().base().as_str(), "http://localhost:1082/polls");
}

// ============================================================================
// SECTION: Requests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn create_posts_resource_to_its_id() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).unwrap();
        let seen = (request.method().as_str().to_string(), request.url().to_string(), body);
        request.respond(Response::from_string("{}")).unwrap();
        seen
    });

    let client = client(&format!("http://{addr}/voters"));
    let voter = Voter::new(VoterId::new(1001), "Test", "");
    let response = client.create(&voter).await.unwrap();
    let (method, path, body) = handle.join().unwrap();

    assert!(response.is_ok());
    assert_eq!(method, "POST");
    assert_eq!(path, "/voters/1001");
    let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent, serde_json::json!({"id": 1001, "name": "Test", "email": ""}));
}
