//! Transport primitives for the relay pipeline.
//!
//! The module exposes [`RelayTransport`] alongside [`OutboundRequest`] and
//! [`RelayResponse`] so downstream crates can integrate custom HTTP clients. The trait is
//! the crate's only dependency on an HTTP stack; the default [`ReqwestTransport`] lives
//! behind the `reqwest` feature.

// std
use std::ops::Deref;
// crates.io
use ::http::{HeaderMap, Method, StatusCode};
// self
use crate::{_prelude::*, error::TransportError};

pub use ::http::{HeaderName, HeaderValue, header};

/// Boxed future returned by [`RelayTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RelayResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing decorated relay requests.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared behind
/// `Arc<T>` across relay instances, and the futures they return must be `Send` so the
/// pipeline's boxed futures inherit the same guarantee. The transport receives requests
/// after decoration and must not mutate authorization headers.
pub trait RelayTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and collects the full response body.
	fn execute<'a>(&'a self, request: &'a OutboundRequest) -> TransportFuture<'a>;
}

/// Request descriptor carried through the pipeline.
///
/// The descriptor owns everything needed to (re-)issue the request, plus the one-shot
/// retry marker that blocks a replayed request from re-entering the refresh path.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Headers supplied by the caller; the decorator stamps credentials on a copy.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	retried: bool,
}
impl OutboundRequest {
	/// Creates a request for the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None, retried: false }
	}

	/// Shorthand for a GET request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Shorthand for a POST request.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Appends a header to the request.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Attaches a request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// True once the request has been replayed after a refresh; such a request is never
	/// routed into the refresh path again.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}
}

/// Fully collected response handed back by a transport.
#[derive(Clone, Debug)]
pub struct RelayResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Collected response body.
	pub body: Vec<u8>,
}
impl RelayResponse {
	/// True when the response signals an authorization fault.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Returns the body as UTF-8 text, lossily.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The same client instance may be shared with an
/// [`HttpRefreshGateway`](crate::gateway::HttpRefreshGateway) so connection pools are
/// reused across data and refresh traffic.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RelayTransport for ReqwestTransport {
	fn execute<'a>(&'a self, request: &'a OutboundRequest) -> TransportFuture<'a> {
		let client = self.0.clone();
		let method = request.method.clone();
		let url = request.url.clone();
		let headers = request.headers.clone();
		let body = request.body.clone();

		Box::pin(async move {
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(RelayResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn fixture_url() -> Url {
		Url::parse("https://api.example.test/positions").expect("Fixture URL should parse.")
	}

	#[test]
	fn retry_marker_is_one_shot() {
		let mut request = OutboundRequest::get(fixture_url());

		assert!(!request.is_retried());

		request.mark_retried();

		assert!(request.is_retried());
	}

	#[test]
	fn unauthorized_classification() {
		let faulted = RelayResponse {
			status: StatusCode::UNAUTHORIZED,
			headers: HeaderMap::new(),
			body: Vec::new(),
		};
		let throttled = RelayResponse {
			status: StatusCode::TOO_MANY_REQUESTS,
			headers: HeaderMap::new(),
			body: Vec::new(),
		};

		assert!(faulted.is_unauthorized());
		assert!(!throttled.is_unauthorized());
	}
}
