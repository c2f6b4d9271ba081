//! Refresh endpoint gateway: the single externally blocking call of the pipeline.
//!
//! The coordinator only ever sees the [`RefreshGateway`] trait; the default
//! [`HttpRefreshGateway`] speaks the backend's wire contract: a bodyless POST whose JSON
//! reply carries a boolean `ok` field plus an optional rotated token, with an optional
//! follow-up status probe for backends that rotate the session server-side.

// self
use crate::{_prelude::*, auth::AccessToken};
#[cfg(feature = "reqwest")]
use crate::error::{TransientError, TransportError};

/// Boxed future returned by [`RefreshGateway::refresh`].
pub type GatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<RefreshReply>> + 'a + Send>>;

/// External collaborator that attempts to obtain a fresh credential.
///
/// Implementations perform one network round trip per call; the coordinator guarantees at
/// most one call is in flight at a time.
pub trait RefreshGateway
where
	Self: Send + Sync,
{
	/// Attempts the refresh and reports the backend's verdict.
	fn refresh(&self) -> GatewayFuture<'_>;
}

/// Outcome reported by a refresh endpoint.
#[derive(Clone, Debug)]
pub struct RefreshReply {
	/// Whether the backend accepted the refresh.
	pub ok: bool,
	/// Rotated access token, absent when the backend manages the session server-side.
	pub token: Option<AccessToken>,
}
impl RefreshReply {
	/// A negative verdict.
	pub fn denied() -> Self {
		Self { ok: false, token: None }
	}

	/// A positive verdict carrying a rotated token.
	pub fn rotated(token: impl Into<String>) -> Self {
		Self { ok: true, token: Some(AccessToken::new(token)) }
	}

	/// A positive verdict without token material (server-side session rotation).
	pub fn session_only() -> Self {
		Self { ok: true, token: None }
	}
}

/// Wire payload of the refresh endpoint.
#[cfg(any(test, feature = "reqwest"))]
#[derive(Debug, Deserialize)]
struct RefreshPayload {
	ok: bool,
	#[serde(default)]
	token: Option<String>,
}

/// Wire payload of the optional status probe.
#[cfg(feature = "reqwest")]
#[derive(Debug, Deserialize)]
struct StatusPayload {
	authenticated: bool,
}

/// Reqwest-backed [`RefreshGateway`] for HTTP refresh endpoints.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct HttpRefreshGateway {
	client: ReqwestClient,
	refresh_url: Url,
	status_url: Option<Url>,
}
#[cfg(feature = "reqwest")]
impl HttpRefreshGateway {
	/// Creates a gateway that POSTs to the provided refresh endpoint.
	pub fn new(client: ReqwestClient, refresh_url: Url) -> Self {
		Self { client, refresh_url, status_url: None }
	}

	/// Adds a status endpoint probed after a token-less success to confirm the session is
	/// now authenticated.
	pub fn with_status_probe(mut self, status_url: Url) -> Self {
		self.status_url = Some(status_url);

		self
	}

	async fn call_refresh(&self) -> Result<RefreshReply> {
		let response =
			self.client.post(self.refresh_url.clone()).send().await.map_err(TransportError::from)?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(TransientError::RefreshEndpoint {
				message: format!("refresh endpoint answered {status}"),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let payload: RefreshPayload = parse_json(&bytes, status.as_u16())?;
		let reply = RefreshReply {
			ok: payload.ok,
			token: payload.token.map(AccessToken::new),
		};

		if reply.ok
			&& reply.token.is_none()
			&& let Some(status_url) = &self.status_url
		{
			return self.confirm_session(status_url.clone()).await;
		}

		Ok(reply)
	}

	async fn confirm_session(&self, status_url: Url) -> Result<RefreshReply> {
		let response = self.client.get(status_url).send().await.map_err(TransportError::from)?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(TransientError::RefreshEndpoint {
				message: format!("status probe answered {status}"),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let payload: StatusPayload = parse_json(&bytes, status.as_u16())?;

		if payload.authenticated {
			Ok(RefreshReply::session_only())
		} else {
			Ok(RefreshReply::denied())
		}
	}
}
#[cfg(feature = "reqwest")]
impl RefreshGateway for HttpRefreshGateway {
	fn refresh(&self) -> GatewayFuture<'_> {
		Box::pin(self.call_refresh())
	}
}

#[cfg(feature = "reqwest")]
fn parse_json<T>(bytes: &[u8], status: u16) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		crate::error::TransientError::RefreshResponseParse { source, status: Some(status) }.into()
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reply_constructors_cover_verdicts() {
		assert!(!RefreshReply::denied().ok);
		assert!(RefreshReply::session_only().ok);

		let rotated = RefreshReply::rotated("t-2");

		assert!(rotated.ok);
		assert_eq!(rotated.token.as_ref().map(AccessToken::expose), Some("t-2"));
	}

	#[test]
	fn payload_tolerates_missing_token_field() {
		let payload: RefreshPayload =
			serde_json::from_str("{\"ok\":true}").expect("Token-less payload should parse.");

		assert!(payload.ok);
		assert!(payload.token.is_none());
	}
}
