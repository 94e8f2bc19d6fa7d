//! Token cache contracts, expiry policy, and built-in credential stores.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{BearerHeader, CachedCredential},
};

/// Boxed future returned by [`CredentialStore`] implementations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the single cached credential.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Loads the stored record. Malformed content is reported as `Ok(None)`.
	fn load(&self) -> StoreFuture<'_, Option<CachedCredential>>;

	/// Persists or replaces the stored record.
	fn save(&self, record: CachedCredential) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// The record could not be serialized.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Maximum credential age applied on top of provider expiries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
	/// Upper bound on credential age in hours. Values `<= 0` disable clamping.
	pub max_hours: i64,
}
impl CachePolicy {
	/// Default credential age bound.
	pub const DEFAULT_MAX_HOURS: i64 = 2;
	/// Largest accepted bound (one hundred years).
	pub const MAX_HOURS: i64 = 24 * 366 * 100;

	/// Creates a policy with the provided bound.
	pub const fn new(max_hours: i64) -> Self {
		Self { max_hours }
	}

	/// Returns the configured bound as a duration, or `None` when it does not fit one.
	pub fn max_age(&self) -> Option<Duration> {
		self.max_hours.checked_mul(3_600).map(Duration::seconds)
	}

	/// Computes the expiry written to the cache.
	///
	/// Provider expiries are clamped to `now + max_hours` when the bound is positive and
	/// used verbatim otherwise. Without a provider expiry the bound alone applies; a bound
	/// that cannot be represented as an instant yields `now`, which the cache refuses to store.
	pub fn effective_expiry(
		&self,
		provider: Option<OffsetDateTime>,
		now: OffsetDateTime,
	) -> OffsetDateTime {
		match provider {
			Some(expires_at) if self.max_hours > 0 =>
				self.ceiling(now).map_or(expires_at, |ceiling| expires_at.min(ceiling)),
			Some(expires_at) => expires_at,
			None => self.ceiling(now).unwrap_or(now),
		}
	}

	fn ceiling(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
		self.max_age().and_then(|age| now.checked_add(age))
	}
}
impl Default for CachePolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_HOURS)
	}
}

/// Expiry-aware facade over a [`CredentialStore`].
#[derive(Clone)]
pub struct TokenCache {
	store: Arc<dyn CredentialStore>,
	policy: CachePolicy,
}
impl TokenCache {
	/// Wraps a store with the provided policy.
	pub fn new(store: Arc<dyn CredentialStore>, policy: CachePolicy) -> Self {
		Self { store, policy }
	}

	/// Returns the policy applied by this cache.
	pub fn policy(&self) -> CachePolicy {
		self.policy
	}

	/// Returns the cached credential when it is present, well-formed, and unexpired at `now`.
	///
	/// Backend failures are logged and treated as a miss.
	pub async fn read(&self, now: OffsetDateTime) -> Option<CachedCredential> {
		let record = match self.store.load().await {
			Ok(record) => record?,
			Err(e) => {
				tracing::warn!(error = %e, "Token cache could not be read.");

				return None;
			},
		};

		if record.is_usable_at(now) {
			Some(record)
		} else {
			tracing::debug!(expires_at = %record.expires_at, "Cached credential is stale.");

			None
		}
	}

	/// Persists `header`, defaulting the expiry to `now + max_hours`.
	///
	/// Returns the written record, or `None` when the expiry is not in the future and the
	/// write was skipped.
	pub async fn write(
		&self,
		header: BearerHeader,
		expires_at: Option<OffsetDateTime>,
		now: OffsetDateTime,
	) -> Result<Option<CachedCredential>, StoreError> {
		let expires_at = expires_at.unwrap_or_else(|| self.policy.effective_expiry(None, now));

		if expires_at <= now {
			tracing::warn!(%expires_at, "Skipping token cache write for an already expired credential.");

			return Ok(None);
		}

		let record = CachedCredential::new(header, expires_at, now);

		self.store.save(record.clone()).await?;

		Ok(Some(record))
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache").field("policy", &self.policy).finish_non_exhaustive()
	}
}
