//! Bearer authorization header wrapper that redacts sensitive material.

// self
use crate::_prelude::*;

const SCHEME: &str = "Bearer ";

/// Complete `Authorization` header value (`Bearer <token>`), redacted in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerHeader(String);
impl BearerHeader {
	/// Wraps a header value that already carries its scheme.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Builds a header from an access token, adding the `Bearer ` scheme unless present.
	pub fn from_access_token(token: &str) -> Option<Self> {
		let token = token.trim();

		if token.is_empty() {
			return None;
		}
		if has_scheme(token) {
			return Some(Self(token.to_owned()));
		}

		Some(Self(format!("{SCHEME}{token}")))
	}

	/// Returns the header value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the header carries no usable value.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}
impl AsRef<str> for BearerHeader {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerHeader").field(&"<redacted>").finish()
	}
}
impl Display for BearerHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

fn has_scheme(value: &str) -> bool {
	value.get(..SCHEME.len()).is_some_and(|prefix| prefix.eq_ignore_ascii_case(SCHEME))
}
