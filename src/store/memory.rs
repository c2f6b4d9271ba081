//! Thread-safe in-memory [`CredentialStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError},
};

/// Thread-safe backend that keeps the credential in-process for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore(RwLock<Credential>);
impl MemoryStore {
	/// Creates a store pre-seeded with the provided credential.
	pub fn seeded(credential: Credential) -> Self {
		Self(RwLock::new(credential))
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> Result<Credential, StoreError> {
		Ok(self.0.read().clone())
	}

	fn save(&self, credential: Credential) -> Result<(), StoreError> {
		*self.0.write() = credential;

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		*self.0.write() = Credential::anonymous();

		Ok(())
	}
}
