//! The authenticated request pipeline: decorator, fault detector, coordinator, queue.

pub mod coordinator;
pub mod decorator;
pub mod queue;

mod execute;

pub use coordinator::*;
pub use decorator::*;
pub use queue::{RefreshOutcome, RefreshTicket};

// self
use crate::{
	_prelude::*,
	gateway::RefreshGateway,
	http::RelayTransport,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{gateway::HttpRefreshGateway, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Relay client specialized for the crate's default reqwest transport.
pub type ReqwestRelayClient = RelayClient<ReqwestTransport>;

/// Front door of the authenticated request pipeline.
///
/// The client owns the transport, the credential store, and the single-flight refresh
/// coordinator so callers issue plain requests and receive resolved responses back; 401
/// detection, refresh coalescing, and replay happen inside [`RelayClient::execute`]. The
/// coordinator is constructed once per client and injected wherever needed; there is no
/// ambient global state.
pub struct RelayClient<T>
where
	T: ?Sized + RelayTransport,
{
	/// Transport used for every outbound request, replays included.
	pub transport: Arc<T>,
	/// Credential store read at send time by the decorator.
	pub store: Arc<dyn CredentialStore>,
	/// Single-flight refresh coordinator shared by all in-flight requests.
	pub coordinator: Arc<RefreshCoordinator>,
}
impl<T> RelayClient<T>
where
	T: ?Sized + RelayTransport,
{
	/// Creates a relay client that reuses the caller-provided transport.
	pub fn with_transport(
		transport: impl Into<Arc<T>>,
		store: Arc<dyn CredentialStore>,
		gateway: Arc<dyn RefreshGateway>,
	) -> Self {
		let coordinator = Arc::new(RefreshCoordinator::new(gateway, store.clone()));

		Self { transport: transport.into(), store, coordinator }
	}

	/// Creates a relay client around an existing coordinator, for callers that share one
	/// coordinator across several transports.
	pub fn with_coordinator(
		transport: impl Into<Arc<T>>,
		store: Arc<dyn CredentialStore>,
		coordinator: Arc<RefreshCoordinator>,
	) -> Self {
		Self { transport: transport.into(), store, coordinator }
	}
}
#[cfg(feature = "reqwest")]
impl RelayClient<ReqwestTransport> {
	/// Creates a relay client with the default reqwest transport and an
	/// [`HttpRefreshGateway`] POSTing to `refresh_url`.
	///
	/// The transport and the gateway share one connection pool.
	pub fn new(store: Arc<dyn CredentialStore>, refresh_url: Url) -> Self {
		let client = ReqwestClient::default();
		let gateway = HttpRefreshGateway::new(client.clone(), refresh_url);

		Self::with_transport(ReqwestTransport::with_client(client), store, Arc::new(gateway))
	}
}
impl<T> Clone for RelayClient<T>
where
	T: ?Sized + RelayTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for RelayClient<T>
where
	T: ?Sized + RelayTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelayClient").field("coordinator", &self.coordinator).finish()
	}
}
