//! Token response normalization.
//!
//! Sign-in helpers hand back tokens in several shapes. [`TokenPayload::classify`] recognizes
//! each of them once, and [`TokenPayload::resolve`] folds the result into an [`AcquiredToken`].

// self
use crate::{_prelude::*, auth::token::header::BearerHeader};

/// Token payload shapes accepted from a sign-in.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenPayload {
	/// Object exposing a ready-made `Authorization` value plus optional expiry.
	Authorization {
		/// Header value, with or without the scheme.
		header: String,
		/// Absolute expiry, when supplied.
		expires_on: Option<OffsetDateTime>,
	},
	/// OAuth token response (`access_token`/`expires_on`/`expires_in`), either as an object
	/// or JSON-encoded inside a string.
	OAuthJson {
		/// Raw access token.
		access_token: String,
		/// Absolute expiry, when supplied.
		expires_on: Option<OffsetDateTime>,
		/// Relative lifetime, when supplied.
		expires_in: Option<Duration>,
	},
	/// Bare token string.
	Bare(String),
	/// Object using the `accessToken`/`ExpiresOn`/`ExpiresIn` casing.
	AccessToken {
		/// Raw access token.
		access_token: String,
		/// Absolute expiry, when supplied.
		expires_on: Option<OffsetDateTime>,
		/// Relative lifetime, when supplied.
		expires_in: Option<Duration>,
	},
}
impl TokenPayload {
	/// Detects which shape `value` uses. Returns `None` when no token can be located.
	pub fn classify(value: &JsonValue) -> Option<Self> {
		match value {
			JsonValue::String(raw) => {
				let trimmed = raw.trim();

				if trimmed.starts_with('{') {
					// Structured payload smuggled through a string.
					let nested = serde_json::from_str::<JsonValue>(trimmed).ok()?;

					return Self::classify(&nested);
				}
				if trimmed.is_empty() {
					return None;
				}

				Some(Self::Bare(trimmed.to_owned()))
			},
			JsonValue::Object(map) => Self::classify_object(map),
			_ => None,
		}
	}

	fn classify_object(map: &JsonMap<String, JsonValue>) -> Option<Self> {
		if let Some(header) = string_field(map, &["Authorization"]) {
			return Some(Self::Authorization {
				header,
				expires_on: instant_field(map, &["ExpiresOn", "ExpiresAt", "expires_on"]),
			});
		}
		if let Some(access_token) = exact_string_field(map, "access_token") {
			return Some(Self::OAuthJson {
				access_token,
				expires_on: instant_field(map, &["expires_on"]),
				expires_in: seconds_field(map, &["expires_in"]),
			});
		}
		if let Some(access_token) = string_field(map, &["accessToken"]) {
			return Some(Self::AccessToken {
				access_token,
				expires_on: instant_field(map, &["ExpiresOn"]),
				expires_in: seconds_field(map, &["ExpiresIn"]),
			});
		}

		None
	}

	/// Returns a short label for logs.
	pub const fn kind(&self) -> &'static str {
		match self {
			TokenPayload::Authorization { .. } => "authorization",
			TokenPayload::OAuthJson { .. } => "oauth_json",
			TokenPayload::Bare(_) => "bare",
			TokenPayload::AccessToken { .. } => "access_token",
		}
	}

	/// Folds the payload into a canonical header plus optional absolute expiry.
	///
	/// Relative lifetimes are anchored at `now`; absolute expiries win when both are present.
	pub fn resolve(self, now: OffsetDateTime) -> Option<AcquiredToken> {
		let (raw, expires_on, expires_in) = match self {
			TokenPayload::Authorization { header, expires_on } => (header, expires_on, None),
			TokenPayload::OAuthJson { access_token, expires_on, expires_in }
			| TokenPayload::AccessToken { access_token, expires_on, expires_in } =>
				(access_token, expires_on, expires_in),
			TokenPayload::Bare(token) => (token, None, None),
		};
		let header = BearerHeader::from_access_token(&raw)?;
		let expires_at =
			expires_on.or_else(|| expires_in.and_then(|lifetime| now.checked_add(lifetime)));

		Some(AcquiredToken { header, expires_at })
	}
}
impl Debug for TokenPayload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPayload").field("kind", &self.kind()).finish_non_exhaustive()
	}
}

/// Canonical result of a sign-in: the bearer header and the provider's expiry, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcquiredToken {
	/// Header value to present to the REST API.
	pub header: BearerHeader,
	/// Provider-reported expiry.
	pub expires_at: Option<OffsetDateTime>,
}

fn lookup<'a>(map: &'a JsonMap<String, JsonValue>, names: &[&str]) -> Option<&'a JsonValue> {
	names.iter().find_map(|name| {
		map.iter()
			.find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_null())
			.map(|(_, value)| value)
	})
}

fn string_field(map: &JsonMap<String, JsonValue>, names: &[&str]) -> Option<String> {
	lookup(map, names).and_then(JsonValue::as_str).map(str::to_owned)
}

fn exact_string_field(map: &JsonMap<String, JsonValue>, name: &str) -> Option<String> {
	map.get(name).and_then(JsonValue::as_str).map(str::to_owned)
}

fn instant_field(map: &JsonMap<String, JsonValue>, names: &[&str]) -> Option<OffsetDateTime> {
	match lookup(map, names)? {
		JsonValue::Number(n) =>
			whole_seconds(n).and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok()),
		JsonValue::String(s) => parse_instant(s),
		_ => None,
	}
}

fn seconds_field(map: &JsonMap<String, JsonValue>, names: &[&str]) -> Option<Duration> {
	let secs = match lookup(map, names)? {
		JsonValue::Number(n) => whole_seconds(n)?,
		JsonValue::String(s) => s.trim().parse().ok()?,
		_ => return None,
	};

	Some(Duration::seconds(secs))
}

// Fractional and float-encoded seconds are truncated.
fn whole_seconds(n: &serde_json::Number) -> Option<i64> {
	n.as_i64().or_else(|| n.as_f64().filter(|secs| secs.is_finite()).map(|secs| secs as i64))
}

fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<i64>() {
		return OffsetDateTime::from_unix_timestamp(secs).ok();
	}

	OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339).ok()
}
