#![cfg(feature = "test")]

// self
use session_client::{
	_preludet::*,
	auth::{Session, SessionField},
	store::{MemoryStore, SessionStore},
};

#[tokio::test]
async fn set_all_then_get_and_load_round_trip() {
	let store = MemoryStore::default();
	let session = session_fixture("access-1", "refresh-1");

	store.set_all(session.clone()).await.expect("Saving a session should succeed.");

	assert_eq!(
		store.get(SessionField::AccessToken).await.expect("Reading a field should succeed."),
		Some("access-1".into())
	);
	assert_eq!(
		store.get(SessionField::WalletAddress).await.expect("Reading a field should succeed."),
		Some("0xfeedbeef".into())
	);
	assert_eq!(store.load().await.expect("Loading should succeed."), Some(session));
}

#[tokio::test]
async fn set_all_replaces_every_field() {
	let store = MemoryStore::with_session(session_fixture("access-old", "refresh-old"));
	let mut replacement = session_fixture("access-new", "refresh-new");

	replacement.identity.office_name = "Ministry of ICT".into();
	store.insert_raw(SessionField::AccessToken, "tampered");
	store.set_all(replacement.clone()).await.expect("Replacing a session should succeed.");

	let entries = store.entries();

	assert_eq!(entries.len(), 4);
	assert_eq!(entries[&SessionField::AccessToken], "access-new");
	assert_eq!(entries[&SessionField::RefreshToken], "refresh-new");
	assert_eq!(entries[&SessionField::OfficeName], "Ministry of ICT");
	assert_eq!(Session::from_entries(&entries), Some(replacement));
}

#[tokio::test]
async fn clear_all_removes_every_field() {
	let store = MemoryStore::with_session(session_fixture("access", "refresh"));

	store.clear_all().await.expect("Clearing should succeed.");

	assert!(store.is_empty());

	for field in SessionField::ALL {
		assert_eq!(store.get(field).await.expect("Reading a field should succeed."), None);
	}

	assert_eq!(store.load().await.expect("Loading should succeed."), None);
}

#[tokio::test]
async fn partial_state_is_visible_per_field_but_not_as_a_session() {
	let store = MemoryStore::default();

	store.insert_raw(SessionField::AccessToken, "orphan-access");

	assert_eq!(
		store.get(SessionField::AccessToken).await.expect("Reading a field should succeed."),
		Some("orphan-access".into())
	);
	assert_eq!(store.get(SessionField::RefreshToken).await.expect("Read should succeed."), None);
	assert_eq!(store.load().await.expect("Loading should succeed."), None);
}

#[tokio::test]
async fn clones_share_the_same_backing_map() {
	let store = MemoryStore::default();
	let shared: Arc<dyn SessionStore> = Arc::new(store.clone());

	shared.set_all(session_fixture("a", "r")).await.expect("Saving through the trait object works.");

	assert_eq!(store.entries().len(), 4);
}
