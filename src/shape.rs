//! Response shaping: projects upstream bodies into the envelopes the dashboard consumes.

// self
use crate::{
	_prelude::*,
	api::{Mode, ModeRequest},
	envelope::Envelope,
	error::UpstreamError,
};

/// Fields kept for each workspace.
pub const WORKSPACE_FIELDS: &[&str] =
	&["id", "name", "type", "isOnDedicatedCapacity", "capacityId", "state"];
/// Fields kept for each dataset.
pub const DATASET_FIELDS: &[&str] =
	&["id", "name", "createdDate", "configuredBy", "isRefreshable", "targetStorageMode"];
/// Fields kept for each refresh history entry.
pub const REFRESH_FIELDS: &[&str] =
	&["requestId", "id", "refreshType", "startTime", "endTime", "status", "serviceExceptionJson"];
/// Fields kept for each report.
pub const REPORT_FIELDS: &[&str] = &["id", "name", "datasetId", "webUrl", "embedUrl", "createdDate"];

/// Builds the success envelope for `request` from the upstream `body`.
///
/// List modes project each item of the `value` array onto a fixed field set (missing fields
/// become `null`) unless `raw` is set, in which case the body is carried verbatim.
pub fn shape(request: &ModeRequest, body: JsonValue) -> Result<Envelope, UpstreamError> {
	let envelope = match request.mode {
		Mode::Workspaces => Envelope::new()
			.with("tenantId", request.tenant_id.as_ref())
			.with("workspaces", list(request, body, WORKSPACE_FIELDS)?),
		Mode::Models => workspace_scoped(request).with("datasets", list(request, body, DATASET_FIELDS)?),
		Mode::Reports => workspace_scoped(request).with("reports", list(request, body, REPORT_FIELDS)?),
		Mode::Refreshes =>
			dataset_scoped(request).with("refreshes", list(request, body, REFRESH_FIELDS)?),
		Mode::Trigger | Mode::Takeover => dataset_scoped(request).with("result", body),
		Mode::Schedule if request.is_schedule_write() =>
			dataset_scoped(request).with("updated", true).with("result", body),
		Mode::Schedule => dataset_scoped(request).with("updated", false).with("schedule", body),
	};

	Ok(envelope)
}

/// Projects every item of a list response onto `fields`.
pub fn project_items(items: &[JsonValue], fields: &[&str]) -> JsonValue {
	items
		.iter()
		.map(|item| {
			fields
				.iter()
				.map(|field| ((*field).to_owned(), item.get(field).cloned().unwrap_or(JsonValue::Null)))
				.collect::<JsonMap<_, _>>()
				.into()
		})
		.collect::<Vec<JsonValue>>()
		.into()
}

fn list(request: &ModeRequest, body: JsonValue, fields: &[&str]) -> Result<JsonValue, UpstreamError> {
	let items = match &body {
		JsonValue::Array(items) => items,
		JsonValue::Object(map) => match map.get("value") {
			Some(JsonValue::Array(items)) => items,
			_ => return Err(unexpected(request.mode)),
		},
		_ => return Err(unexpected(request.mode)),
	};

	if request.raw {
		return Ok(body);
	}

	Ok(project_items(items, fields))
}

fn unexpected(mode: Mode) -> UpstreamError {
	UpstreamError::UnexpectedShape { mode: mode.as_str(), reason: "no `value` array in the response" }
}

fn workspace_scoped(request: &ModeRequest) -> Envelope {
	Envelope::new().with("workspaceId", id_value(request.workspace_id.as_deref()))
}

fn dataset_scoped(request: &ModeRequest) -> Envelope {
	workspace_scoped(request).with("datasetId", id_value(request.dataset_id.as_deref()))
}

fn id_value(id: Option<&str>) -> JsonValue {
	id.map_or(JsonValue::Null, JsonValue::from)
}
