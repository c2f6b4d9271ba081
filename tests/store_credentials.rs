//! Behavior tests for the built-in credential store backends.

// std
use std::{
	env, fs,
	path::PathBuf,
	process,
	time::{SystemTime, UNIX_EPOCH},
};
// self
use auth_relay::{
	auth::{AccessToken, Credential, UserId},
	store::{CredentialStore, FileStore, MemoryStore},
};

fn fixture_credential(token: &str) -> Credential {
	Credential::bearer(token)
		.with_user(UserId::new("trader-1").expect("User fixture should be valid."))
}

#[test]
fn memory_store_defaults_to_anonymous() {
	let store = MemoryStore::default();

	assert!(store.load().expect("Load should succeed.").is_anonymous());
}

#[test]
fn memory_store_last_writer_wins() {
	let store = MemoryStore::default();

	store.save(fixture_credential("t-1")).expect("First save should succeed.");
	store.save(fixture_credential("t-2")).expect("Second save should succeed.");

	let credential = store.load().expect("Load should succeed.");

	assert_eq!(credential.token.as_ref().map(AccessToken::expose), Some("t-2"));
}

#[test]
fn memory_store_clear_resets_to_anonymous() {
	let store = MemoryStore::seeded(fixture_credential("t-1"));

	store.clear().expect("Clear should succeed.");

	let credential = store.load().expect("Load should succeed.");

	assert!(credential.is_anonymous());
	assert!(credential.user.is_none());
}

fn temp_path() -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System clock should be past the epoch.")
		.as_nanos();
	let unique = format!("auth_relay_store_it_{}_{nanos}.json", process::id());

	env::temp_dir().join(unique)
}

#[test]
fn file_store_persists_the_documented_keys() {
	let path = temp_path();
	let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

	store.save(fixture_credential("t-1")).expect("Save should succeed.");

	let raw = fs::read_to_string(&path).expect("Snapshot file should be readable.");

	assert!(raw.contains("\"access_token\""), "Snapshot must use the documented token key.");
	assert!(raw.contains("\"acting_user\""), "Snapshot must use the documented user key.");

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary credential snapshot {}: {e}", path.display())
	});
}

#[test]
fn file_store_rejects_invalid_snapshots() {
	let path = temp_path();

	fs::write(&path, b"{\"access_token\":").expect("Writing the corrupt snapshot should succeed.");

	assert!(FileStore::open(&path).is_err(), "A corrupt snapshot must fail loudly, not reset.");

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary credential snapshot {}: {e}", path.display())
	});
}
