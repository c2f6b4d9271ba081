//! Process-wide credential value shared by the pipeline.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserId},
};

/// Current bearer credential: an optional access token plus the acting-user identifier.
///
/// There is exactly one live value per [`CredentialStore`](crate::store::CredentialStore);
/// last writer wins. An absent token is a valid state (anonymous).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Opaque bearer token, absent while anonymous.
	pub token: Option<AccessToken>,
	/// Acting-user identifier stamped alongside the token.
	pub user: Option<UserId>,
}
impl Credential {
	/// Returns the anonymous credential (no token, no user).
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// Creates a credential carrying the provided token.
	pub fn bearer(token: impl Into<String>) -> Self {
		Self { token: Some(AccessToken::new(token)), user: None }
	}

	/// Attaches the acting-user identifier.
	pub fn with_user(mut self, user: UserId) -> Self {
		self.user = Some(user);

		self
	}

	/// Replaces the access token, keeping the acting user.
	pub fn with_token(mut self, token: AccessToken) -> Self {
		self.token = Some(token);

		self
	}

	/// True when no token is present.
	pub fn is_anonymous(&self) -> bool {
		self.token.is_none()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn anonymous_has_no_token() {
		let credential = Credential::anonymous();

		assert!(credential.is_anonymous());
		assert!(credential.user.is_none());
	}

	#[test]
	fn builders_compose() {
		let user = UserId::new("trader-7").expect("User fixture should be valid.");
		let credential = Credential::bearer("t-1").with_user(user.clone());

		assert!(!credential.is_anonymous());
		assert_eq!(credential.user, Some(user));

		let rotated = credential.with_token(AccessToken::new("t-2"));

		assert_eq!(rotated.token.as_ref().map(AccessToken::expose), Some("t-2"));
		assert!(rotated.user.is_some(), "Token rotation must keep the acting user.");
	}
}
