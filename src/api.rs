//! Power BI REST dispatcher.
//!
//! [`ModeRequest::plan`] validates parameters and picks the endpoint; [`ApiClient`] issues
//! exactly one call per invocation and returns the parsed body. [`ApiClient::dispatch`]
//! strings the whole pipeline together: plan, acquire, call, shape.

pub mod mode;

pub use mode::*;

// crates.io
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::BearerHeader,
	envelope::Envelope,
	error::UpstreamError,
	flows::Broker,
	http::{self, ReqwestHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ServiceDescriptor,
	shape,
};

/// Issues authenticated calls against the configured API base.
#[derive(Clone, Debug)]
pub struct ApiClient {
	http_client: ReqwestHttpClient,
	descriptor: ServiceDescriptor,
}
impl ApiClient {
	/// Creates a client for the descriptor's API base.
	pub fn new(http_client: ReqwestHttpClient, descriptor: ServiceDescriptor) -> Self {
		Self { http_client, descriptor }
	}

	/// Runs one mode end to end: validate, acquire a header, call, and shape the response.
	///
	/// Parameters are validated before any sign-in or network activity.
	pub async fn dispatch(&self, broker: &Broker, request: &ModeRequest) -> Result<Envelope> {
		let call = request.plan()?;
		let takeover = request.takeover_call()?;
		let header = broker.acquire().await?;

		if let Some(takeover) = takeover {
			// Failure is expected when the caller already owns the dataset.
			if let Err(e) = self.execute(&takeover, &header).await {
				tracing::warn!(error = %e, "Dataset takeover failed; continuing with the schedule update.");
			}
		}

		let body = self.execute(&call, &header).await?;

		Ok(shape::shape(request, body)?)
	}

	/// Issues `call` with `header` and returns the parsed body. An empty body parses as `{}`.
	pub async fn execute(
		&self,
		call: &ApiCall,
		header: &BearerHeader,
	) -> Result<JsonValue, UpstreamError> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, call.method.as_str());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_inner(call, header)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn execute_inner(
		&self,
		call: &ApiCall,
		header: &BearerHeader,
	) -> Result<JsonValue, UpstreamError> {
		let url = self.descriptor.api_url(&call.path, call.query.as_deref());
		let mut request = self
			.http_client
			.request(call.method.into(), url.clone())
			.header(AUTHORIZATION, header.expose());

		if call.method.is_mutating() {
			request = request
				.header(CONTENT_TYPE, "application/json")
				.body(call.body.clone().unwrap_or_default());
		}

		tracing::debug!(method = call.method.as_str(), %url, "Calling Power BI.");

		let network = |source| UpstreamError::Network { url: url.to_string(), source };
		let response = request
			.send()
			.await
			.inspect_err(|_| obs::record_dispatch_status(call.method.as_str(), None))
			.map_err(network)?;
		let status = response.status();

		obs::record_dispatch_status(call.method.as_str(), Some(status.as_u16()));

		let retry_after = http::parse_retry_after(response.headers());
		let text = response.text().await.map_err(network)?;

		if !status.is_success() {
			return Err(UpstreamError::status(
				call.method.as_str(),
				url,
				status.as_u16(),
				&text,
				retry_after,
			));
		}

		parse_body(&url, &text)
	}
}

fn parse_body(url: &Url, text: &str) -> Result<JsonValue, UpstreamError> {
	let text = text.trim_start_matches('\u{feff}');

	if text.trim().is_empty() {
		return Ok(JsonValue::Object(JsonMap::new()));
	}

	serde_json::from_str(text).map_err(|source| UpstreamError::Decode { url: url.to_string(), source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url() -> Url {
		Url::parse("https://api.powerbi.com/v1.0/myorg/groups").expect("Fixture URL should parse.")
	}

	#[test]
	fn empty_bodies_parse_as_empty_objects() {
		assert_eq!(parse_body(&url(), "").expect("Empty body should parse."), serde_json::json!({}));
		assert_eq!(parse_body(&url(), " \n").expect("Blank body should parse."), serde_json::json!({}));
	}

	#[test]
	fn invalid_json_is_a_decode_error() {
		let err = parse_body(&url(), "<html>").expect_err("HTML is not JSON.");

		assert!(matches!(err, UpstreamError::Decode { .. }));
	}
}
