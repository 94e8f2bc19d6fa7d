//! Credential acquisition: cache lookup, interactive sign-in, and cache write-back.

pub mod acquire;
pub mod device_code;

pub use device_code::*;

// self
use crate::{_prelude::*, error::AuthError, store::TokenCache};

/// Boxed future returned by [`SignIn`] implementations.
pub type SignInFuture<'a> = Pin<Box<dyn Future<Output = Result<JsonValue, AuthError>> + 'a + Send>>;

/// Interactive authentication step run on a cache miss.
///
/// Implementations return the raw token payload; the broker classifies it through
/// [`TokenPayload`](crate::auth::TokenPayload) so any of the recognized shapes is accepted.
pub trait SignIn
where
	Self: Send + Sync,
{
	/// Authenticates the operator and returns the provider's token payload.
	fn sign_in(&self) -> SignInFuture<'_>;
}

/// Supplies bearer headers, minting new ones only when the cache cannot.
#[derive(Clone)]
pub struct Broker {
	/// Expiry-aware cache consulted before every sign-in.
	pub cache: TokenCache,
	/// Sign-in used on a cache miss.
	pub sign_in: Arc<dyn SignIn>,
}
impl Broker {
	/// Creates a broker over the provided cache and sign-in.
	pub fn new(cache: TokenCache, sign_in: Arc<dyn SignIn>) -> Self {
		Self { cache, sign_in }
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker").field("cache", &self.cache).finish_non_exhaustive()
	}
}
