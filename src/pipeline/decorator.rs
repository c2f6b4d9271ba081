//! Outbound request decorator.
//!
//! Pure and synchronous: the only effect is reading the provided [`Credential`]. The
//! decorator is not involved in refresh logic; it stamps whatever credential is current at
//! send time, including a freshly installed one on replay.

// crates.io
use ::http::header::{AUTHORIZATION, HeaderName, HeaderValue};
// self
use crate::{_prelude::*, auth::Credential, error::ConfigError, http::OutboundRequest};

/// Header carrying the acting-user identifier for multi-tenant testing.
pub const ACTING_USER_HEADER: HeaderName = HeaderName::from_static("x-acting-user");

/// Returns a copy of the request stamped with the credential's headers.
///
/// An anonymous credential leaves the request untouched. Stamping uses `insert`, so
/// decorating twice with an unchanged credential yields identical headers.
pub fn decorate(
	request: &OutboundRequest,
	credential: &Credential,
) -> Result<OutboundRequest, ConfigError> {
	let mut stamped = request.clone();

	if let Some(token) = &credential.token {
		stamped.headers.insert(AUTHORIZATION, token.header_value()?);
	}
	if let Some(user) = &credential.user {
		stamped.headers.insert(ACTING_USER_HEADER, HeaderValue::from_str(user)?);
	}

	Ok(stamped)
}
