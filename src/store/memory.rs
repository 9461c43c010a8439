//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionField},
	store::{SessionStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionField, String>>>;

/// Thread-safe storage backend that keeps the session in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store already holding `session`.
	pub fn with_session(session: Session) -> Self {
		let store = Self::default();

		Self::set_all_now(&store.0, session);

		store
	}

	/// Writes a single raw field, bypassing the whole-record contract.
	///
	/// Stands in for another writer sharing the same storage (a different tab, a migration, a
	/// test fixture) so partially populated states can be reproduced.
	pub fn insert_raw(&self, field: SessionField, value: impl Into<String>) {
		self.0.write().insert(field, value.into());
	}

	/// Copies the raw key/value contents.
	pub fn entries(&self) -> HashMap<SessionField, String> {
		self.0.read().clone()
	}

	/// Returns `true` when no field is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn set_all_now(map: &StoreMap, session: Session) {
		let mut guard = map.write();

		guard.clear();
		guard.extend(session.to_entries());
	}
}
impl SessionStore for MemoryStore {
	fn get(&self, field: SessionField) -> StoreFuture<'_, Option<String>> {
		let value = self.0.read().get(&field).cloned();

		Box::pin(async move { Ok(value) })
	}

	fn load(&self) -> StoreFuture<'_, Option<Session>> {
		let snapshot = Session::from_entries(&self.0.read());

		Box::pin(async move { Ok(snapshot) })
	}

	fn set_all(&self, session: Session) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::set_all_now(&map, session);

			Ok::<_, StoreError>(())
		})
	}

	fn clear_all(&self) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().clear();

			Ok(())
		})
	}
}
