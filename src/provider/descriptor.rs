//! Service descriptor data structures and endpoint derivation.

/// Builder API for assembling service descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::TenantId};

/// Immutable service descriptor consumed by the sign-in and dispatch stages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
	/// Identity provider host (`https://login.microsoftonline.com` by default).
	pub authority: Url,
	/// Identity tenant that issues the token.
	pub tenant: TenantId,
	/// Public client identifier used for the device-code grant.
	pub client_id: String,
	/// Scope requested for the Power BI API.
	pub scope: String,
	/// Power BI REST base (`https://api.powerbi.com` by default).
	pub api_base: Url,
}
impl ServiceDescriptor {
	/// Default identity authority.
	pub const DEFAULT_AUTHORITY: &'static str = "https://login.microsoftonline.com";
	/// Default Power BI REST base.
	pub const DEFAULT_API_BASE: &'static str = "https://api.powerbi.com";
	/// Public client id of the Power BI desktop/PowerShell application.
	pub const DEFAULT_CLIENT_ID: &'static str = "ea0616ba-638b-4df5-95b9-636659ae5121";
	/// Default scope covering every delegated Power BI permission of the client.
	pub const DEFAULT_SCOPE: &'static str = "https://analysis.windows.net/powerbi/api/.default";

	/// Creates a new builder for the provided tenant.
	pub fn builder(tenant: TenantId) -> ServiceDescriptorBuilder {
		ServiceDescriptorBuilder::new(tenant)
	}

	/// Returns the device authorization endpoint for the configured tenant.
	pub fn device_authorization_endpoint(&self) -> Url {
		self.identity_endpoint("devicecode")
	}

	/// Returns the token endpoint for the configured tenant.
	pub fn token_endpoint(&self) -> Url {
		self.identity_endpoint("token")
	}

	/// Resolves a REST path (and optional raw query) against the API base.
	pub fn api_url(&self, path: &str, query: Option<&str>) -> Url {
		let mut url = self.api_base.clone();

		url.set_path(&join_path(self.api_base.path(), path));
		url.set_query(query);

		url
	}

	fn identity_endpoint(&self, leaf: &str) -> Url {
		let mut url = self.authority.clone();

		url.set_path(&join_path(self.authority.path(), &format!("{}/oauth2/v2.0/{leaf}", self.tenant)));
		url.set_query(None);

		url
	}
}

fn join_path(base: &str, tail: &str) -> String {
	format!("{}/{}", base.trim_end_matches('/'), tail.trim_start_matches('/'))
}
