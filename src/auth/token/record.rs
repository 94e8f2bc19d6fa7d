//! Cached credential record persisted between invocations.

// self
use crate::{_prelude::*, auth::token::header::BearerHeader};

/// Bearer header plus expiry bookkeeping, stored as
/// `{"Authorization", "ExpiresAt", "CachedAt"}` with RFC 3339 timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCredential {
	/// Complete authorization header value.
	#[serde(rename = "Authorization")]
	pub authorization: BearerHeader,
	/// Instant after which the header must not be reused.
	#[serde(rename = "ExpiresAt", with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	/// Instant the record was written.
	#[serde(rename = "CachedAt", with = "time::serde::rfc3339")]
	pub cached_at: OffsetDateTime,
}
impl CachedCredential {
	/// Creates a record stamped with `cached_at`.
	pub fn new(
		authorization: BearerHeader,
		expires_at: OffsetDateTime,
		cached_at: OffsetDateTime,
	) -> Self {
		Self { authorization, expires_at, cached_at }
	}

	/// Returns `true` if the record can still be presented at the provided instant.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		!self.authorization.is_blank() && self.expires_at > instant
	}
}
