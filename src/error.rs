//! Broker-level error types shared by the acquirer, dispatcher, shaper, and stores.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error surfaced by the command entry point.
///
/// Every variant maps onto one error-envelope category through [`Error::category`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Invocation parameters are missing or malformed for the selected mode.
	#[error(transparent)]
	Parameter(#[from] ParameterError),
	/// Token acquisition failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// The REST call failed or returned something unusable.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Token cache persistence failed.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns the stable category label written into error envelopes.
	pub const fn category(&self) -> &'static str {
		match self {
			Error::Parameter(_) => "ParameterError",
			Error::Auth(_) => "AuthError",
			Error::Upstream(_) => "UpstreamError",
			Error::Storage(_) => "StorageError",
			Error::Config(_) => "ConfigError",
		}
	}

	/// Returns supplementary detail for error envelopes, when the failure carries any.
	pub fn details(&self) -> Option<String> {
		match self {
			Error::Auth(err) => err.details(),
			Error::Upstream(err) => err.details(),
			Error::Config(ConfigError::HttpClientBuild { source }) => Some(source.to_string()),
			_ => None,
		}
	}
}

/// Parameter validation failures raised before any network activity.
#[derive(Debug, ThisError)]
pub enum ParameterError {
	/// A parameter required by the selected mode was not supplied.
	#[error("Mode `{mode}` requires the {name} parameter.")]
	Missing {
		/// Mode label that demanded the parameter.
		mode: &'static str,
		/// Parameter name as spelled on the command line.
		name: &'static str,
	},
	/// A supplied parameter failed validation.
	#[error("Parameter {name} is invalid: {reason}.")]
	Invalid {
		/// Parameter name as spelled on the command line.
		name: &'static str,
		/// Human-readable validation failure.
		reason: String,
	},
	/// Command-line arguments could not be parsed.
	#[error("{message}")]
	Arguments {
		/// Parser output describing the problem.
		message: String,
	},
}

/// Token acquisition failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The identity provider response carried no usable token.
	#[error("Unable to obtain access token.")]
	MissingToken,
	/// The identity provider answered with an OAuth error.
	#[error("Identity provider rejected the {stage} request: {message}.")]
	Provider {
		/// Sign-in stage that failed (`device_code` or `token`).
		stage: &'static str,
		/// Provider error code or description.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The identity provider answered with malformed JSON.
	#[error("Identity provider returned malformed JSON during the {stage} request.")]
	Parse {
		/// Sign-in stage that failed.
		stage: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The identity provider could not be reached.
	#[error("Network error occurred while contacting the identity provider.")]
	Network {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// The sign-in request could not be constructed or failed for another reason.
	#[error("Sign-in failed: {message}.")]
	Other {
		/// Human-readable failure summary.
		message: String,
	},
}
impl AuthError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	fn details(&self) -> Option<String> {
		match self {
			AuthError::Provider { status: Some(status), .. } => Some(format!("HTTP {status}")),
			AuthError::Parse { source, .. } => Some(source.to_string()),
			AuthError::Network { source } => Some(source.to_string()),
			_ => None,
		}
	}
}

/// REST call failures.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// The API answered with a non-success status.
	#[error("{method} {url} returned HTTP {status}.")]
	Status {
		/// HTTP verb of the failed call.
		method: &'static str,
		/// Fully resolved endpoint URL.
		url: String,
		/// HTTP status code.
		status: u16,
		/// Response body preview.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// The API could not be reached.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Fully resolved endpoint URL.
		url: String,
		/// Transport failure.
		#[source]
		source: ReqwestError,
	},
	/// The API answered with a body that is not JSON.
	#[error("{url} returned a body that is not valid JSON.")]
	Decode {
		/// Fully resolved endpoint URL.
		url: String,
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// The API answered with JSON in an unexpected shape.
	#[error("Unexpected response for mode `{mode}`: {reason}.")]
	UnexpectedShape {
		/// Mode whose projection failed.
		mode: &'static str,
		/// What was missing.
		reason: &'static str,
	},
}
impl UpstreamError {
	const BODY_PREVIEW_LIMIT: usize = 2_048;

	/// Builds a [`UpstreamError::Status`] keeping only a bounded preview of the body.
	pub fn status(
		method: &'static str,
		url: impl Into<String>,
		status: u16,
		body: &str,
		retry_after: Option<Duration>,
	) -> Self {
		let body = body.chars().take(Self::BODY_PREVIEW_LIMIT).collect();

		Self::Status { method, url: url.into(), status, body, retry_after }
	}

	fn details(&self) -> Option<String> {
		match self {
			UpstreamError::Status { body, retry_after, .. } => {
				let mut details = body.trim().to_owned();

				if let Some(delay) = retry_after {
					if !details.is_empty() {
						details.push('\n');
					}

					details.push_str(&format!("Retry after {} seconds.", delay.whole_seconds()));
				}

				(!details.is_empty()).then_some(details)
			},
			UpstreamError::Network { source, .. } => Some(source.to_string()),
			UpstreamError::Decode { source, .. } => Some(source.to_string()),
			UpstreamError::UnexpectedShape { .. } => None,
		}
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint URL could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Service descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ServiceDescriptorError),
	/// The default token cache location could not be resolved.
	#[error("Token cache location could not be resolved.")]
	CacheLocation {
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}
