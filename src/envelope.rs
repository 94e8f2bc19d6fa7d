//! JSON envelopes written to standard output.

// self
use crate::_prelude::*;

/// Success envelope: a flat mapping from key to value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(JsonMap<String, JsonValue>);
impl Envelope {
	/// Creates an empty envelope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces `key`.
	pub fn with(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
		self.0.insert(key.to_owned(), value.into());

		self
	}

	/// Returns the value under `key`.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.get(key)
	}

	/// Returns the envelope keys.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// Converts the envelope into a JSON value.
	pub fn into_json(self) -> JsonValue {
		JsonValue::Object(self.0)
	}

	/// Renders compact JSON.
	pub fn to_json_string(&self) -> String {
		self.to_string()
	}
}
impl Display for Envelope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write_compact(f, self)
	}
}

/// Failure envelope: `{message, category, details}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
	/// Human-readable summary.
	pub message: String,
	/// Error category label.
	pub category: String,
	/// Supplementary detail, `null` when absent.
	pub details: Option<String>,
}
impl ErrorEnvelope {
	/// Renders compact JSON.
	pub fn to_json_string(&self) -> String {
		self.to_string()
	}
}
impl Display for ErrorEnvelope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write_compact(f, self)
	}
}
impl From<&Error> for ErrorEnvelope {
	fn from(error: &Error) -> Self {
		Self {
			message: error.to_string(),
			category: error.category().to_owned(),
			details: error.details(),
		}
	}
}

fn write_compact<T>(f: &mut Formatter, value: &T) -> FmtResult
where
	T: Serialize,
{
	let rendered = serde_json::to_string(value).map_err(|_| std::fmt::Error)?;

	f.write_str(&rendered)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::error::{ParameterError, UpstreamError};

	#[test]
	fn envelope_renders_as_flat_object() {
		let envelope = Envelope::new().with("workspaceId", "W1").with("result", json!({}));

		let rendered = envelope.to_json_string();

		assert!(!rendered.contains('\n'));
		assert_eq!(
			serde_json::from_str::<JsonValue>(&rendered).expect("Envelope should be JSON."),
			json!({ "workspaceId": "W1", "result": {} })
		);
	}

	#[test]
	fn error_envelope_keeps_null_details() {
		let error: Error = ParameterError::Missing { mode: "models", name: "workspaceId" }.into();
		let rendered: JsonValue = serde_json::from_str(&ErrorEnvelope::from(&error).to_json_string())
			.expect("Error envelope should be JSON.");

		assert_eq!(
			rendered,
			json!({
				"message": "Mode `models` requires the workspaceId parameter.",
				"category": "ParameterError",
				"details": null,
			})
		);
	}

	#[test]
	fn envelopes_render_in_field_order() {
		let error: Error = ParameterError::Missing { mode: "trigger", name: "datasetId" }.into();

		assert_eq!(
			ErrorEnvelope::from(&error).to_json_string(),
			r#"{"message":"Mode `trigger` requires the datasetId parameter.","category":"ParameterError","details":null}"#
		);
		assert_eq!(
			Envelope::new().with("workspaceId", "W1").with("datasetId", "D1").to_json_string(),
			r#"{"workspaceId":"W1","datasetId":"D1"}"#
		);
	}

	#[test]
	fn upstream_error_envelope_carries_body() {
		let error: Error =
			UpstreamError::status("GET", "https://api.powerbi.com/x", 401, "{\"code\":\"TokenExpired\"}", None)
				.into();
		let envelope = ErrorEnvelope::from(&error);

		assert_eq!(envelope.category, "UpstreamError");
		assert_eq!(envelope.details.as_deref(), Some("{\"code\":\"TokenExpired\"}"));
		assert!(envelope.message.contains("HTTP 401"));
	}
}
