//! Strongly typed identifiers that end up inside Power BI and identity endpoint paths.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;
const PATH_DELIMITERS: [char; 4] = ['/', '?', '#', '%'];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty")]
	Empty {
		/// Kind of identifier (tenant, workspace, dataset).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace")]
	ContainsWhitespace {
		/// Kind of identifier (tenant, workspace, dataset).
		kind: &'static str,
	},
	/// The identifier contains a character that would alter the request path.
	#[error("{kind} identifier contains the URL delimiter `{delimiter}`")]
	ContainsDelimiter {
		/// Kind of identifier (tenant, workspace, dataset).
		kind: &'static str,
		/// Offending character.
		delimiter: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters")]
	TooLong {
		/// Kind of identifier (tenant, workspace, dataset).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { TenantId, "Identity tenant (directory id, domain, or `common`).", "Tenant" }
def_id! { WorkspaceId, "Power BI workspace (group) identifier.", "Workspace" }
def_id! { DatasetId, "Power BI dataset (semantic model) identifier.", "Dataset" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if let Some(delimiter) = view.chars().find(|c| PATH_DELIMITERS.contains(c)) {
		return Err(IdentifierError::ContainsDelimiter { kind, delimiter });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
