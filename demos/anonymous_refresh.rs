//! Demonstrates the failure path: an anonymous request faults, the refresh is denied, and
//! the caller receives its original 401 while the store stays anonymous.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use auth_relay::{
	auth::Credential,
	gateway::HttpRefreshGateway,
	http::{OutboundRequest, ReqwestTransport},
	pipeline::{RefreshState, RelayClient},
	reqwest::Client,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _unauthorized = server
		.mock_async(|when, then| {
			when.method(GET).path("/watchlist");
			then.status(401).body("login required");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").body("{\"ok\":false}");
		})
		.await;
	let store_backend = Arc::new(MemoryStore::seeded(Credential::anonymous()));
	let store: Arc<dyn CredentialStore> = store_backend.clone();
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
	let response = relay.execute(OutboundRequest::get(Url::parse(&server.url("/watchlist"))?)).await?;

	println!("caller sees its original fault: {} {}", response.status, response.text());

	refresh.assert_calls_async(1).await;

	assert_eq!(relay.coordinator.state(), RefreshState::Idle);
	assert!(store_backend.load()?.is_anonymous());

	println!("coordinator is idle again; store untouched.");

	Ok(())
}
