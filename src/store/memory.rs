//! Thread-safe in-memory [`CredentialStore`] implementation for tests and embedding.

// self
use crate::{
	_prelude::*,
	auth::CachedCredential,
	store::{CredentialStore, StoreFuture},
};

type Slot = Arc<RwLock<Option<CachedCredential>>>;

/// Storage backend that keeps the credential in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Creates a store pre-seeded with `record`.
	pub fn with_record(record: CachedCredential) -> Self {
		Self(Arc::new(RwLock::new(Some(record))))
	}

	/// Returns a copy of the stored record.
	pub fn snapshot(&self) -> Option<CachedCredential> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<CachedCredential>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn save(&self, record: CachedCredential) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(record);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::auth::BearerHeader;

	#[tokio::test]
	async fn save_replaces_previous_record() {
		let now = datetime!(2030-01-01 00:00 UTC);
		let store = MemoryStore::with_record(CachedCredential::new(
			BearerHeader::new("Bearer old"),
			now + Duration::HOUR,
			now,
		));

		store
			.save(CachedCredential::new(BearerHeader::new("Bearer new"), now + Duration::HOUR, now))
			.await
			.expect("Memory store save should succeed.");

		let loaded = store.load().await.expect("Memory store load should succeed.");

		assert_eq!(loaded.map(|r| r.authorization), Some(BearerHeader::new("Bearer new")));
	}
}
