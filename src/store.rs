//! Storage contract and built-in backends for the process-wide credential.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Storage backend contract for the single current [`Credential`].
///
/// The pipeline models backing storage as a durable key-value store with synchronous
/// read/write, so implementations expose blocking accessors; anything slower than a local
/// lock or file write belongs behind a cache. Mutations follow last-writer-wins.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the current credential; anonymous when nothing has been stored yet.
	fn load(&self) -> Result<Credential, StoreError>;

	/// Replaces the current credential.
	fn save(&self, credential: Credential) -> Result<(), StoreError>;

	/// Resets the credential to anonymous (logout or unrecoverable refresh failure).
	fn clear(&self) -> Result<(), StoreError>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
