//! Mode table: which parameters each mode needs and which endpoint it calls.

// crates.io
use clap::ValueEnum;
// self
use crate::{
	_prelude::*,
	auth::{DatasetId, TenantId, WorkspaceId},
	error::ParameterError,
};

/// Operation selected by `--mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	/// List workspaces visible to the signed-in user.
	Workspaces,
	/// List datasets (semantic models) in a workspace.
	Models,
	/// List the refresh history of a dataset.
	Refreshes,
	/// Queue a data refresh of a dataset.
	Trigger,
	/// List reports in a workspace.
	Reports,
	/// Read or replace the refresh schedule of a dataset.
	Schedule,
	/// Take over ownership of a dataset.
	Takeover,
}
impl Mode {
	/// Returns the label used on the command line and in logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Mode::Workspaces => "workspaces",
			Mode::Models => "models",
			Mode::Refreshes => "refreshes",
			Mode::Trigger => "trigger",
			Mode::Reports => "reports",
			Mode::Schedule => "schedule",
			Mode::Takeover => "takeover",
		}
	}
}
impl Display for Mode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// HTTP verbs issued by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// Read-only call.
	Get,
	/// Mutating call creating work upstream.
	Post,
	/// Mutating call replacing a resource.
	Patch,
}
impl HttpMethod {
	/// Returns the verb as sent on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Patch => "PATCH",
		}
	}

	/// Returns `true` for verbs that carry a JSON body.
	pub const fn is_mutating(self) -> bool {
		!matches!(self, HttpMethod::Get)
	}
}
impl From<HttpMethod> for reqwest::Method {
	fn from(method: HttpMethod) -> Self {
		match method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
			HttpMethod::Patch => reqwest::Method::PATCH,
		}
	}
}

/// One planned REST call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCall {
	/// HTTP verb.
	pub method: HttpMethod,
	/// Path relative to the API base.
	pub path: String,
	/// Raw query string, without the leading `?`.
	pub query: Option<String>,
	/// Raw JSON body for mutating calls.
	pub body: Option<String>,
}
impl ApiCall {
	fn get(path: String) -> Self {
		Self { method: HttpMethod::Get, path, query: None, body: None }
	}

	fn post(path: String, body: Option<String>) -> Self {
		Self { method: HttpMethod::Post, path, query: None, body }
	}
}

/// Validated invocation parameters for one mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeRequest {
	/// Selected operation.
	pub mode: Mode,
	/// Identity tenant, echoed by the `workspaces` envelope.
	pub tenant_id: TenantId,
	/// Target workspace.
	pub workspace_id: Option<WorkspaceId>,
	/// Target dataset.
	pub dataset_id: Option<DatasetId>,
	/// Refresh history depth.
	pub top: u32,
	/// Emit the unprojected upstream payload.
	pub raw: bool,
	/// Raw JSON body for schedule writes; absent means a schedule read.
	pub schedule_json: Option<String>,
	/// Take over the dataset before a schedule write.
	pub takeover: bool,
}
impl ModeRequest {
	/// Default refresh history depth.
	pub const DEFAULT_TOP: u32 = 10;

	const TRIGGER_BODY: &'static str = r#"{"type":"dataOnly"}"#;

	/// Creates a request with no identifiers and default options.
	pub fn new(mode: Mode, tenant_id: TenantId) -> Self {
		Self {
			mode,
			tenant_id,
			workspace_id: None,
			dataset_id: None,
			top: Self::DEFAULT_TOP,
			raw: false,
			schedule_json: None,
			takeover: false,
		}
	}

	/// Sets the target workspace.
	pub fn with_workspace(mut self, workspace_id: WorkspaceId) -> Self {
		self.workspace_id = Some(workspace_id);

		self
	}

	/// Sets the target dataset.
	pub fn with_dataset(mut self, dataset_id: DatasetId) -> Self {
		self.dataset_id = Some(dataset_id);

		self
	}

	/// Sets the schedule body. Blank input is treated as absent.
	pub fn with_schedule_json(mut self, schedule_json: impl Into<String>) -> Self {
		let schedule_json = schedule_json.into();

		self.schedule_json = (!schedule_json.trim().is_empty()).then_some(schedule_json);

		self
	}

	/// Returns `true` when a schedule request replaces the schedule.
	pub fn is_schedule_write(&self) -> bool {
		self.mode == Mode::Schedule && self.schedule_json.is_some()
	}

	/// Validates the parameters the mode needs and plans its REST call.
	pub fn plan(&self) -> Result<ApiCall, ParameterError> {
		let call = match self.mode {
			Mode::Workspaces => ApiCall::get("/v1.0/myorg/groups".into()),
			Mode::Models => {
				let ws = self.workspace()?;

				ApiCall::get(format!("/v1.0/myorg/groups/{ws}/datasets"))
			},
			Mode::Refreshes => {
				self.workspace()?;

				let ds = self.dataset()?;

				if self.top == 0 {
					return Err(ParameterError::Invalid {
						name: "top",
						reason: "must be at least 1".into(),
					});
				}

				ApiCall {
					query: Some(format!("$top={}", self.top)),
					..ApiCall::get(format!("/v1.0/myorg/datasets/{ds}/refreshes"))
				}
			},
			Mode::Reports => {
				let ws = self.workspace()?;

				ApiCall::get(format!("/v1.0/myorg/groups/{ws}/reports"))
			},
			Mode::Trigger => ApiCall::post(
				format!("{}/refreshes", self.dataset_path()?),
				Some(Self::TRIGGER_BODY.into()),
			),
			Mode::Schedule => {
				let path = format!("{}/refreshSchedule", self.dataset_path()?);

				match &self.schedule_json {
					Some(body) => ApiCall {
						method: HttpMethod::Patch,
						path,
						query: None,
						body: Some(body.clone()),
					},
					None => ApiCall::get(path),
				}
			},
			Mode::Takeover => ApiCall::post(format!("{}/Default.TakeOver", self.dataset_path()?), None),
		};

		Ok(call)
	}

	/// Plans the optional takeover issued ahead of a schedule write.
	pub fn takeover_call(&self) -> Result<Option<ApiCall>, ParameterError> {
		if !(self.takeover && self.is_schedule_write()) {
			return Ok(None);
		}

		Ok(Some(ApiCall::post(format!("{}/Default.TakeOver", self.dataset_path()?), None)))
	}

	fn workspace(&self) -> Result<&WorkspaceId, ParameterError> {
		self.workspace_id
			.as_ref()
			.ok_or(ParameterError::Missing { mode: self.mode.as_str(), name: "workspaceId" })
	}

	fn dataset(&self) -> Result<&DatasetId, ParameterError> {
		self.dataset_id
			.as_ref()
			.ok_or(ParameterError::Missing { mode: self.mode.as_str(), name: "datasetId" })
	}

	fn dataset_path(&self) -> Result<String, ParameterError> {
		let ws = self.workspace()?;
		let ds = self.dataset()?;

		Ok(format!("/v1.0/myorg/groups/{ws}/datasets/{ds}"))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request(mode: Mode) -> ModeRequest {
		ModeRequest::new(mode, TenantId::new("common").expect("Tenant fixture should be valid."))
	}

	fn full(mode: Mode) -> ModeRequest {
		request(mode)
			.with_workspace(WorkspaceId::new("W1").expect("Workspace fixture should be valid."))
			.with_dataset(DatasetId::new("D1").expect("Dataset fixture should be valid."))
	}

	#[test]
	fn endpoint_table() {
		let cases = [
			(request(Mode::Workspaces), HttpMethod::Get, "/v1.0/myorg/groups", None),
			(full(Mode::Models), HttpMethod::Get, "/v1.0/myorg/groups/W1/datasets", None),
			(full(Mode::Refreshes), HttpMethod::Get, "/v1.0/myorg/datasets/D1/refreshes", Some("$top=10")),
			(full(Mode::Reports), HttpMethod::Get, "/v1.0/myorg/groups/W1/reports", None),
			(full(Mode::Trigger), HttpMethod::Post, "/v1.0/myorg/groups/W1/datasets/D1/refreshes", None),
			(
				full(Mode::Schedule),
				HttpMethod::Get,
				"/v1.0/myorg/groups/W1/datasets/D1/refreshSchedule",
				None,
			),
			(
				full(Mode::Takeover),
				HttpMethod::Post,
				"/v1.0/myorg/groups/W1/datasets/D1/Default.TakeOver",
				None,
			),
		];

		for (request, method, path, query) in cases {
			let call = request.plan().expect("Complete requests should plan.");

			assert_eq!(call.method, method, "{}", request.mode);
			assert_eq!(call.path, path, "{}", request.mode);
			assert_eq!(call.query.as_deref(), query, "{}", request.mode);
		}
	}

	#[test]
	fn trigger_requests_a_data_only_refresh() {
		let call = full(Mode::Trigger).plan().expect("Trigger should plan.");

		assert_eq!(call.body.as_deref(), Some(r#"{"type":"dataOnly"}"#));
	}

	#[test]
	fn schedule_body_switches_to_patch() {
		let call = full(Mode::Schedule)
			.with_schedule_json(r#"{"value":{"enabled":true}}"#)
			.plan()
			.expect("Schedule write should plan.");

		assert_eq!(call.method, HttpMethod::Patch);
		assert_eq!(call.body.as_deref(), Some(r#"{"value":{"enabled":true}}"#));

		let blank = full(Mode::Schedule).with_schedule_json("  ");

		assert!(!blank.is_schedule_write());
		assert_eq!(blank.plan().expect("Blank schedule should read.").method, HttpMethod::Get);
	}

	#[test]
	fn missing_identifiers_are_named() {
		let err = request(Mode::Refreshes)
			.with_workspace(WorkspaceId::new("W1").expect("Workspace fixture should be valid."))
			.plan()
			.expect_err("Refreshes without a dataset must fail.");

		assert_eq!(err.to_string(), "Mode `refreshes` requires the datasetId parameter.");

		let err = request(Mode::Models).plan().expect_err("Models without a workspace must fail.");

		assert!(matches!(err, ParameterError::Missing { name: "workspaceId", .. }));
	}

	#[test]
	fn refreshes_require_positive_top() {
		let mut request = full(Mode::Refreshes);

		request.top = 0;

		assert!(matches!(request.plan(), Err(ParameterError::Invalid { name: "top", .. })));

		request.top = 25;

		assert_eq!(request.plan().expect("Top should plan.").query.as_deref(), Some("$top=25"));
	}

	#[test]
	fn takeover_precedes_schedule_writes_only() {
		let mut write = full(Mode::Schedule).with_schedule_json("{}");

		assert_eq!(write.takeover_call().expect("Takeover should plan."), None);

		write.takeover = true;

		let call = write.takeover_call().expect("Takeover should plan.").expect("Flag is set.");

		assert_eq!(call.path, "/v1.0/myorg/groups/W1/datasets/D1/Default.TakeOver");

		let mut read = full(Mode::Schedule);

		read.takeover = true;

		assert_eq!(read.takeover_call().expect("Takeover should plan."), None);
	}

	#[test]
	fn mode_labels_round_trip_through_serde() {
		let mode: Mode = serde_json::from_str("\"takeover\"").expect("Mode should deserialize.");

		assert_eq!(mode, Mode::Takeover);
		assert_eq!(Mode::Refreshes.to_string(), "refreshes");
	}
}
