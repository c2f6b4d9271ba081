//! Simple file-backed [`CredentialStore`] for lightweight deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError},
};

/// Persists the credential to a JSON file after each mutation.
///
/// The snapshot uses stable field names (`access_token`, `acting_user`) so other tooling can
/// read or seed the file.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: RwLock<Credential>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot =
			if path.exists() { Self::load_snapshot(&path)? } else { Credential::anonymous() };

		Ok(Self { path, inner: RwLock::new(snapshot) })
	}

	fn load_snapshot(path: &Path) -> Result<Credential, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Credential::anonymous());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let snapshot: CredentialSnapshot =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		snapshot.try_into()
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist(&self, credential: &Credential) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot = CredentialSnapshot::from(credential);
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> Result<Credential, StoreError> {
		Ok(self.inner.read().clone())
	}

	fn save(&self, credential: Credential) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		self.persist(&credential)?;
		*guard = credential;

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		self.save(Credential::anonymous())
	}
}

/// On-disk representation with the documented persistence keys.
#[derive(Debug, Serialize, Deserialize)]
struct CredentialSnapshot {
	access_token: Option<String>,
	acting_user: Option<String>,
}
impl From<&Credential> for CredentialSnapshot {
	fn from(credential: &Credential) -> Self {
		Self {
			access_token: credential.token.as_ref().map(|t| t.expose().to_owned()),
			acting_user: credential.user.as_ref().map(|u| u.as_ref().to_owned()),
		}
	}
}
impl TryFrom<CredentialSnapshot> for Credential {
	type Error = StoreError;

	fn try_from(snapshot: CredentialSnapshot) -> Result<Self, Self::Error> {
		let token = snapshot.access_token.map(crate::auth::AccessToken::new);
		let user = snapshot
			.acting_user
			.map(|raw| {
				crate::auth::UserId::new(&raw).map_err(|e| StoreError::Serialization {
					message: format!("Invalid acting_user in snapshot: {e}"),
				})
			})
			.transpose()?;

		Ok(Self { token, user })
	}
}
