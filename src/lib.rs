//! Single-flight token refresh and transparent 401 replay for bearer-authenticated HTTP
//! pipelines. Credentials are stamped on every outbound call, concurrent refreshes coalesce
//! into one gateway exchange, and suspended requests replay in arrival order.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod pipeline;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		gateway::HttpRefreshGateway,
		http::ReqwestTransport,
		pipeline::RelayClient,
		store::{CredentialStore, MemoryStore},
	};

	/// Relay client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestRelay = RelayClient<ReqwestTransport>;

	/// Builds a reqwest client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Constructs a [`RelayClient`] backed by an in-memory credential store and an
	/// [`HttpRefreshGateway`] pointed at the provided refresh endpoint.
	pub fn build_reqwest_test_relay(refresh_url: Url) -> (ReqwestTestRelay, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let client = test_reqwest_client();
		let gateway = HttpRefreshGateway::new(client.clone(), refresh_url);
		let relay = RelayClient::with_transport(
			ReqwestTransport::with_client(client),
			store,
			Arc::new(gateway),
		);

		(relay, store_backend)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
