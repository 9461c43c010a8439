//! Storage contracts and built-in session stores.
//!
//! A store holds the four session fields as string values. Writes are whole-record: a refresh
//! replaces all four at once and a failed refresh or sign-out clears all four at once, so no
//! reader can observe a new access token next to an old refresh token. Concurrent writers race
//! and the last write wins.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Session, SessionField},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by session stores.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads a single persisted field.
	fn get(&self, field: SessionField) -> StoreFuture<'_, Option<String>>;

	/// Reads every field in one snapshot; `None` unless all four are present.
	fn load(&self) -> StoreFuture<'_, Option<Session>>;

	/// Replaces all four fields in one write.
	fn set_all(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Removes all four fields in one write.
	fn clear_all(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`SessionStore`] implementations.
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

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
