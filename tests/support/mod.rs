//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use httpmock::MockServer;
use serde_json::Value as JsonValue;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use pbi_broker::{
	api::ApiClient,
	auth::{BearerHeader, CachedCredential, TenantId},
	error::AuthError,
	flows::{Broker, SignIn, SignInFuture},
	http::ReqwestHttpClient,
	provider::ServiceDescriptor,
	store::{CachePolicy, CredentialStore, MemoryStore, TokenCache},
};

/// Sign-in double that returns a fixed payload and counts invocations.
pub struct StaticSignIn {
	payload: Result<JsonValue, String>,
	calls: AtomicUsize,
}
impl StaticSignIn {
	pub fn ok(payload: JsonValue) -> Arc<Self> {
		Arc::new(Self { payload: Ok(payload), calls: AtomicUsize::new(0) })
	}

	pub fn failing(message: &str) -> Arc<Self> {
		Arc::new(Self { payload: Err(message.to_owned()), calls: AtomicUsize::new(0) })
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl SignIn for StaticSignIn {
	fn sign_in(&self) -> SignInFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let payload = self.payload.clone();

		Box::pin(async move { payload.map_err(|message| AuthError::Other { message }) })
	}
}

pub fn tenant() -> TenantId {
	TenantId::new("common").expect("Tenant fixture should be valid.")
}

/// Plain-http loopback base of `server`; the descriptor only accepts http on loopback hosts.
pub fn loopback_base(server: &MockServer) -> String {
	format!("http://{}", server.address())
}

pub fn descriptor(server: &MockServer) -> ServiceDescriptor {
	let base = Url::parse(&loopback_base(server)).expect("Mock server URL should parse.");

	ServiceDescriptor::builder(tenant())
		.authority(base.clone())
		.api_base(base)
		.build()
		.expect("Loopback descriptor should validate.")
}

pub fn api_client(server: &MockServer) -> ApiClient {
	ApiClient::new(ReqwestHttpClient::new().expect("HTTP client should build."), descriptor(server))
}

pub fn live_record(header: &str) -> CachedCredential {
	let now = OffsetDateTime::now_utc();

	CachedCredential::new(BearerHeader::new(header), now + Duration::HOUR, now)
}

pub fn broker_with(store: impl CredentialStore + 'static, sign_in: Arc<StaticSignIn>) -> Broker {
	Broker::new(TokenCache::new(Arc::new(store), CachePolicy::default()), sign_in)
}

/// Broker whose cache already holds `header`; sign-in must never run.
pub fn cached_broker(header: &str) -> (Broker, Arc<StaticSignIn>) {
	let sign_in = StaticSignIn::failing("sign-in should not run");
	let broker = broker_with(MemoryStore::with_record(live_record(header)), sign_in.clone());

	(broker, sign_in)
}
