#![cfg(feature = "reqwest")]

//! Wire-contract tests for the HTTP refresh gateway.

// crates.io
use httpmock::prelude::*;
// self
use auth_relay::{
	auth::AccessToken,
	error::{Error, TransientError},
	gateway::{HttpRefreshGateway, RefreshGateway},
	url::Url,
};

fn test_client() -> reqwest::Client {
	reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

fn refresh_url(server: &MockServer) -> Url {
	Url::parse(&server.url("/auth/refresh")).expect("Mock refresh endpoint should parse.")
}

#[tokio::test]
async fn success_with_token_is_reported_as_rotation() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"ok\":true,\"token\":\"t-9\"}");
		})
		.await;
	let gateway = HttpRefreshGateway::new(test_client(), refresh_url(&server));
	let reply = gateway.refresh().await.expect("Refresh call should complete.");

	assert!(reply.ok);
	assert_eq!(reply.token.as_ref().map(AccessToken::expose), Some("t-9"));

	mock.assert_async().await;
}

#[tokio::test]
async fn negative_verdict_is_not_an_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body("{\"ok\":false}");
		})
		.await;
	let gateway = HttpRefreshGateway::new(test_client(), refresh_url(&server));
	let reply = gateway.refresh().await.expect("A denial is a completed call, not an error.");

	assert!(!reply.ok);
	assert!(reply.token.is_none());
}

#[tokio::test]
async fn non_success_status_maps_to_transient_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(503);
		})
		.await;
	let gateway = HttpRefreshGateway::new(test_client(), refresh_url(&server));
	let err = gateway.refresh().await.expect_err("A 5xx verdict should surface as an error.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::RefreshEndpoint { status: Some(503), .. }),
	));
}

#[tokio::test]
async fn malformed_json_maps_to_parse_error_with_path() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"ok\":\"yes\"}");
		})
		.await;
	let gateway = HttpRefreshGateway::new(test_client(), refresh_url(&server));
	let err = gateway.refresh().await.expect_err("Malformed JSON should surface as an error.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::RefreshResponseParse { status: Some(200), .. }),
	));
}

#[tokio::test]
async fn token_less_success_consults_the_status_probe() {
	let server = MockServer::start_async().await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let probe = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/status");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"authenticated\":true}");
		})
		.await;
	let status_url =
		Url::parse(&server.url("/auth/status")).expect("Mock status endpoint should parse.");
	let gateway =
		HttpRefreshGateway::new(test_client(), refresh_url(&server)).with_status_probe(status_url);
	let reply = gateway.refresh().await.expect("Refresh call should complete.");

	assert!(reply.ok);
	assert!(reply.token.is_none());

	refresh.assert_async().await;
	probe.assert_async().await;
}

#[tokio::test]
async fn unauthenticated_probe_downgrades_the_verdict() {
	let server = MockServer::start_async().await;
	let _refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body("{\"ok\":true}");
		})
		.await;
	let _probe = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/status");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"authenticated\":false}");
		})
		.await;
	let status_url =
		Url::parse(&server.url("/auth/status")).expect("Mock status endpoint should parse.");
	let gateway =
		HttpRefreshGateway::new(test_client(), refresh_url(&server)).with_status_probe(status_url);
	let reply = gateway.refresh().await.expect("Refresh call should complete.");

	assert!(!reply.ok, "A session the backend cannot confirm must count as a failed refresh.");
}
