//! Secure access-token wrapper that redacts sensitive material.

// crates.io
use ::http::header::HeaderValue;
// self
use crate::{_prelude::*, error::ConfigError};

/// Redacted access-token wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the token as a `Bearer` authorization header value, marked sensitive so
	/// HTTP stacks suppress it from debug output.
	pub fn header_value(&self) -> Result<HeaderValue, ConfigError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = AccessToken::new("super-secret");

		assert_eq!(format!("{token:?}"), "AccessToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn header_value_is_bearer_and_sensitive() {
		let token = AccessToken::new("t-123");
		let value = token.header_value().expect("Bearer header should encode successfully.");

		assert_eq!(value.to_str().expect("Header should be visible ASCII."), "Bearer t-123");
		assert!(value.is_sensitive());
	}

	#[test]
	fn header_value_rejects_control_characters() {
		let token = AccessToken::new("bad\ntoken");

		assert!(token.header_value().is_err());
	}
}
