//! Device-code facade over the `oauth2` crate.
//!
//! [`DeviceCodeFacade`] owns a typestate-configured `oauth2` client and exposes the two halves
//! of the device authorization grant: requesting a [`DeviceCodeTicket`] and polling the token
//! endpoint until the operator approves it. `oauth2` failures are folded into [`AuthError`].

pub use oauth2;

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{
	AuthType, ClientId, DeviceAuthorizationUrl, EndpointNotSet, EndpointSet, ErrorResponseType,
	HttpClientError, RequestTokenError, Scope, StandardDeviceAuthorizationResponse,
	StandardErrorResponse, TokenUrl, basic::BasicClient,
};
// self
use crate::{
	_prelude::*,
	error::AuthError,
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ServiceDescriptor,
};

type DeviceCodeClient =
	BasicClient<EndpointNotSet, EndpointSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Device authorization issued by the identity provider and awaiting operator approval.
#[derive(Clone, Debug)]
pub struct DeviceCodeTicket(StandardDeviceAuthorizationResponse);
impl DeviceCodeTicket {
	/// Page the operator must visit.
	pub fn verification_uri(&self) -> &str {
		self.0.verification_uri().as_str()
	}

	/// Code the operator must enter.
	pub fn user_code(&self) -> &str {
		self.0.user_code().secret()
	}

	/// Lifetime of the device code.
	pub fn expires_in(&self) -> StdDuration {
		self.0.expires_in()
	}

	/// Polling interval requested by the provider.
	pub fn interval(&self) -> StdDuration {
		self.0.interval()
	}
}

/// Public-client device authorization grant bound to one [`ServiceDescriptor`].
#[derive(Clone, Debug)]
pub struct DeviceCodeFacade {
	oauth_client: DeviceCodeClient,
	http_client: ReqwestHttpClient,
	scope: String,
}
impl DeviceCodeFacade {
	/// Configures the facade from the descriptor's derived endpoints.
	pub fn from_descriptor(descriptor: &ServiceDescriptor, http_client: ReqwestHttpClient) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(descriptor.client_id.clone()))
			.set_auth_type(AuthType::RequestBody)
			.set_device_authorization_url(DeviceAuthorizationUrl::from_url(
				descriptor.device_authorization_endpoint(),
			))
			.set_token_uri(TokenUrl::from_url(descriptor.token_endpoint()));

		Self { oauth_client, http_client, scope: descriptor.scope.clone() }
	}

	/// Requests a device code for the configured scope.
	pub async fn request_device_code(&self) -> Result<DeviceCodeTicket, AuthError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.instrumented(meta.clone());
		let details: StandardDeviceAuthorizationResponse = self
			.oauth_client
			.exchange_device_code()
			.add_scope(Scope::new(self.scope.clone()))
			.request_async(&handle)
			.await
			.map_err(|e| map_request_error("device_code", meta.take(), e))?;

		Ok(DeviceCodeTicket(details))
	}

	/// Polls the token endpoint until the ticket is approved, denied, or expires.
	///
	/// Returns the token response as JSON so it can flow through payload classification.
	pub async fn poll_token(&self, ticket: &DeviceCodeTicket) -> Result<JsonValue, AuthError> {
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_device_access_token(&ticket.0)
			.request_async(&handle, tokio::time::sleep, None)
			.await
			.map_err(|e| map_request_error("token", meta.take(), e))?;

		serde_json::to_value(&response).map_err(|e| AuthError::Other {
			message: format!("token response could not be re-encoded: {e}"),
		})
	}
}

fn map_request_error<T>(
	stage: &'static str,
	meta: Option<ResponseMetadata>,
	err: RequestTokenError<HttpClientError<ReqwestError>, StandardErrorResponse<T>>,
) -> AuthError
where
	T: 'static + ErrorResponseType + AsRef<str> + std::fmt::Display,
{
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let message = match response.error_description() {
				Some(description) => format!("{}: {description}", response.error().as_ref()),
				None => response.error().as_ref().to_owned(),
			};

			AuthError::Provider { stage, message, status }
		},
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) => AuthError::Parse { stage, source, status },
		RequestTokenError::Other(message) => AuthError::Provider { stage, message, status },
	}
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> AuthError {
	match err {
		HttpClientError::Reqwest(inner) => AuthError::network(*inner),
		HttpClientError::Io(inner) => AuthError::network(inner),
		HttpClientError::Http(inner) =>
			AuthError::Other { message: format!("request could not be built: {inner}") },
		HttpClientError::Other(message) => AuthError::Other { message },
		_ => AuthError::Other { message: "unknown HTTP client error".into() },
	}
}
