//! Bearer header acquisition.
//!
//! [`Broker::acquire`] serves the cached header while it is unexpired. Otherwise it runs the
//! configured [`SignIn`](crate::flows::SignIn), normalizes the payload, clamps the expiry
//! with the cache policy, and writes the result back before returning it.

// self
use crate::{
	_prelude::*,
	auth::{BearerHeader, TokenPayload},
	error::AuthError,
	flows::Broker,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Broker {
	/// Returns a bearer header, re-authenticating on a cache miss.
	pub async fn acquire(&self) -> Result<BearerHeader> {
		const KIND: FlowKind = FlowKind::Acquire;

		let span = FlowSpan::new(KIND, "acquire");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.acquire_inner()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn acquire_inner(&self) -> Result<BearerHeader> {
		if let Some(cached) = self.cache.read(OffsetDateTime::now_utc()).await {
			tracing::debug!(expires_at = %cached.expires_at, "Serving cached credential.");

			return Ok(cached.authorization);
		}

		let payload = self.sign_in_once().await?;
		let now = OffsetDateTime::now_utc();
		let token = TokenPayload::classify(&payload)
			.inspect(|p| tracing::debug!(shape = p.kind(), "Classified token payload."))
			.and_then(|p| p.resolve(now))
			.ok_or(AuthError::MissingToken)?;
		let expires_at = self.cache.policy().effective_expiry(token.expires_at, now);

		self.cache.write(token.header.clone(), Some(expires_at), now).await?;

		Ok(token.header)
	}

	async fn sign_in_once(&self) -> Result<JsonValue, AuthError> {
		const KIND: FlowKind = FlowKind::SignIn;

		let span = FlowSpan::new(KIND, "sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.sign_in.sign_in()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(e) => {
				tracing::warn!(error = %e, "Sign-in failed.");
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		auth::CachedCredential,
		flows::{SignIn, SignInFuture},
		store::{CachePolicy, MemoryStore, TokenCache},
	};

	struct FixedSignIn {
		payload: JsonValue,
		calls: AtomicUsize,
	}
	impl FixedSignIn {
		fn new(payload: JsonValue) -> Arc<Self> {
			Arc::new(Self { payload, calls: AtomicUsize::new(0) })
		}
	}
	impl SignIn for FixedSignIn {
		fn sign_in(&self) -> SignInFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let payload = self.payload.clone();

			Box::pin(async move { Ok(payload) })
		}
	}

	fn broker(store: &MemoryStore, max_hours: i64, sign_in: Arc<FixedSignIn>) -> Broker {
		Broker::new(TokenCache::new(Arc::new(store.clone()), CachePolicy::new(max_hours)), sign_in)
	}

	#[tokio::test]
	async fn cache_hit_skips_sign_in() {
		let now = OffsetDateTime::now_utc();
		let store = MemoryStore::with_record(CachedCredential::new(
			BearerHeader::new("Bearer cached"),
			now + Duration::HOUR,
			now,
		));
		let sign_in = FixedSignIn::new(json!("fresh"));
		let header = broker(&store, 2, sign_in.clone()).acquire().await.expect("Cache hit should succeed.");

		assert_eq!(header.expose(), "Bearer cached");
		assert_eq!(sign_in.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn cache_miss_signs_in_and_clamps_expiry() {
		let store = MemoryStore::default();
		let sign_in = FixedSignIn::new(json!({ "access_token": "fresh", "expires_in": 86_400 }));
		let before = OffsetDateTime::now_utc();
		let header = broker(&store, 2, sign_in.clone()).acquire().await.expect("Sign-in should succeed.");
		let written = store.snapshot().expect("Sign-in should populate the cache.");

		assert_eq!(header.expose(), "Bearer fresh");
		assert_eq!(written.authorization, header);
		assert!(written.expires_at <= OffsetDateTime::now_utc() + Duration::hours(2));
		assert!(written.expires_at > before + Duration::hours(2) - Duration::MINUTE);
		assert_eq!(sign_in.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn expired_entry_triggers_sign_in() {
		let now = OffsetDateTime::now_utc();
		let store = MemoryStore::with_record(CachedCredential::new(
			BearerHeader::new("Bearer stale"),
			now - Duration::MINUTE,
			now - Duration::HOUR,
		));
		let sign_in = FixedSignIn::new(json!({ "Authorization": "Bearer fresh" }));
		let header = broker(&store, 2, sign_in).acquire().await.expect("Sign-in should succeed.");

		assert_eq!(header.expose(), "Bearer fresh");
	}

	#[tokio::test]
	async fn payload_without_token_is_an_auth_error() {
		let store = MemoryStore::default();
		let sign_in = FixedSignIn::new(json!({ "token_type": "Bearer" }));
		let err = broker(&store, 2, sign_in).acquire().await.expect_err("Payload has no token.");

		assert!(matches!(err, Error::Auth(AuthError::MissingToken)));
		assert_eq!(err.to_string(), "Unable to obtain access token.");
		assert!(store.snapshot().is_none());
	}

	#[tokio::test]
	async fn non_positive_bound_keeps_provider_expiry() {
		let store = MemoryStore::default();
		let expires_on = (OffsetDateTime::now_utc() + Duration::hours(10)).unix_timestamp();
		let sign_in = FixedSignIn::new(json!({ "access_token": "fresh", "expires_on": expires_on }));

		broker(&store, 0, sign_in).acquire().await.expect("Sign-in should succeed.");

		let written = store.snapshot().expect("Future provider expiry should be cached.");

		assert_eq!(written.expires_at.unix_timestamp(), expires_on);
	}

	#[tokio::test]
	async fn non_positive_bound_without_provider_expiry_skips_the_write() {
		let store = MemoryStore::default();
		let sign_in = FixedSignIn::new(json!("bare-token"));
		let header = broker(&store, 0, sign_in).acquire().await.expect("Sign-in should succeed.");

		assert_eq!(header.expose(), "Bearer bare-token");
		assert!(store.snapshot().is_none());
	}
}
