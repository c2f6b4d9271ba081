//! Demonstrates the full pipeline against a mock backend: three concurrent requests hit a
//! 401, share a single refresh call, and replay transparently with the rotated token.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use auth_relay::{
	auth::{Credential, UserId},
	gateway::HttpRefreshGateway,
	http::{OutboundRequest, ReqwestTransport},
	pipeline::RelayClient,
	reqwest::Client,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/positions").header("authorization", "Bearer t-1");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"ok\":true,\"token\":\"t-2\"}")
				.delay(Duration::from_millis(200));
		})
		.await;
	let _fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/positions").header("authorization", "Bearer t-2");
			then.status(200).body("[{\"symbol\":\"ESZ6\",\"qty\":3}]");
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::seeded(
		Credential::bearer("t-1").with_user(UserId::new("trader-1")?),
	));
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let gateway =
		HttpRefreshGateway::new(client.clone(), Url::parse(&server.url("/auth/refresh"))?);
	let relay = RelayClient::with_transport(
		ReqwestTransport::with_client(client),
		store,
		Arc::new(gateway),
	);
	let positions_url = Url::parse(&server.url("/positions"))?;
	let request = || OutboundRequest::get(positions_url.clone());
	let (a, b, c) =
		tokio::join!(relay.execute(request()), relay.execute(request()), relay.execute(request()));

	for response in [a?, b?, c?] {
		println!("{} {}", response.status, response.text());
	}

	refresh.assert_calls_async(1).await;

	let metrics = relay.coordinator.metrics();

	println!(
		"refreshes: {} (coalesced waiters: {}).",
		metrics.attempts(),
		metrics.joins(),
	);

	Ok(())
}
