// std
use std::net::IpAddr;
// self
use crate::{_prelude::*, auth::TenantId, error::ConfigError, provider::ServiceDescriptor};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ServiceDescriptorError {
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoints must not carry credentials, queries, or fragments.
	#[error("The {endpoint} endpoint must be a plain base URL: {url}.")]
	UnexpectedEndpointParts {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Client id must be a non-empty token without whitespace.
	#[error("Client id must be non-empty and contain no whitespace.")]
	InvalidClientId,
	/// Scope must be non-empty.
	#[error("Scope cannot be empty.")]
	EmptyScope,
}

/// Builder for [`ServiceDescriptor`] values.
#[derive(Debug)]
pub struct ServiceDescriptorBuilder {
	/// Identity tenant for the descriptor being constructed.
	pub tenant: TenantId,
	/// Identity authority override.
	pub authority: Option<Url>,
	/// Client id override.
	pub client_id: Option<String>,
	/// Scope override.
	pub scope: Option<String>,
	/// REST base override.
	pub api_base: Option<Url>,
}
impl ServiceDescriptorBuilder {
	/// Creates a new builder seeded with the provided tenant.
	pub fn new(tenant: TenantId) -> Self {
		Self { tenant, authority: None, client_id: None, scope: None, api_base: None }
	}

	/// Sets the identity authority.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Sets the public client id.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the REST base.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ServiceDescriptor, ConfigError> {
		let authority = match self.authority {
			Some(url) => url,
			None => parse_endpoint("authority", ServiceDescriptor::DEFAULT_AUTHORITY)?,
		};
		let api_base = match self.api_base {
			Some(url) => url,
			None => parse_endpoint("api base", ServiceDescriptor::DEFAULT_API_BASE)?,
		};
		let descriptor = ServiceDescriptor {
			authority,
			tenant: self.tenant,
			client_id: self
				.client_id
				.unwrap_or_else(|| ServiceDescriptor::DEFAULT_CLIENT_ID.to_owned()),
			scope: self.scope.unwrap_or_else(|| ServiceDescriptor::DEFAULT_SCOPE.to_owned()),
			api_base,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ServiceDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ServiceDescriptorError> {
		validate_endpoint("authority", &self.authority)?;
		validate_endpoint("api base", &self.api_base)?;

		if self.client_id.is_empty() || self.client_id.chars().any(char::is_whitespace) {
			return Err(ServiceDescriptorError::InvalidClientId);
		}
		if self.scope.trim().is_empty() {
			return Err(ServiceDescriptorError::EmptyScope);
		}

		Ok(())
	}
}

/// Parses an endpoint URL, tagging failures with the endpoint name.
pub fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), ServiceDescriptorError> {
	let secure = match url.scheme() {
		"https" => true,
		"http" => is_loopback(url),
		_ => false,
	};

	if !secure {
		return Err(ServiceDescriptorError::InsecureEndpoint { endpoint, url: url.to_string() });
	}
	if !url.username().is_empty()
		|| url.password().is_some()
		|| url.query().is_some()
		|| url.fragment().is_some()
	{
		return Err(ServiceDescriptorError::UnexpectedEndpointParts {
			endpoint,
			url: url.to_string(),
		});
	}

	Ok(())
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.is_ok_and(|ip| ip.is_loopback()),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> ServiceDescriptorBuilder {
		ServiceDescriptor::builder(TenantId::new("common").expect("Tenant fixture should be valid."))
	}

	fn url(raw: &str) -> Url {
		Url::parse(raw).expect("Fixture URL should parse.")
	}

	#[test]
	fn defaults_target_public_cloud() {
		let descriptor = builder().build().expect("Defaults should validate.");

		assert_eq!(descriptor.authority.as_str(), "https://login.microsoftonline.com/");
		assert_eq!(descriptor.api_base.as_str(), "https://api.powerbi.com/");
		assert_eq!(descriptor.client_id, ServiceDescriptor::DEFAULT_CLIENT_ID);
		assert_eq!(descriptor.scope, ServiceDescriptor::DEFAULT_SCOPE);
	}

	#[test]
	fn plain_http_is_only_allowed_for_loopback() {
		builder()
			.api_base(url("http://127.0.0.1:9000"))
			.authority(url("http://localhost:9001"))
			.build()
			.expect("Loopback endpoints should validate.");
		builder().api_base(url("http://[::1]:9000")).build().expect("IPv6 loopback should validate.");

		let err = builder()
			.api_base(url("http://api.powerbi.com"))
			.build()
			.expect_err("Remote plain HTTP must be rejected.");

		assert!(matches!(
			err,
			ConfigError::Descriptor(ServiceDescriptorError::InsecureEndpoint { endpoint: "api base", .. })
		));
	}

	#[test]
	fn endpoints_reject_queries_and_credentials() {
		assert!(builder().authority(url("https://login.example.com/?x=1")).build().is_err());
		assert!(builder().api_base(url("https://user:pw@api.example.com")).build().is_err());
	}

	#[test]
	fn client_id_and_scope_are_validated() {
		assert!(matches!(
			builder().client_id("with space").build(),
			Err(ConfigError::Descriptor(ServiceDescriptorError::InvalidClientId))
		));
		assert!(matches!(
			builder().scope(" ").build(),
			Err(ConfigError::Descriptor(ServiceDescriptorError::EmptyScope))
		));
	}

	#[test]
	fn unparsable_endpoints_name_the_endpoint() {
		let err = parse_endpoint("authority", "not a url").expect_err("Garbage should not parse.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "authority", .. }));
	}
}
