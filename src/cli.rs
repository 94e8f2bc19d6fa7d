//! Command-line surface: argument parsing, pipeline wiring, and error rendering.

// std
use std::ffi::OsString;
// crates.io
use clap::Parser;
// self
use crate::{
	_prelude::*,
	api::{ApiClient, Mode, ModeRequest},
	auth::{DatasetId, IdentifierError, TenantId, WorkspaceId},
	envelope::Envelope,
	error::ParameterError,
	flows::{Broker, DeviceCodeSignIn},
	http::ReqwestHttpClient,
	provider::{ServiceDescriptor, parse_endpoint},
	store::{CachePolicy, FileStore, TokenCache},
};

/// Power BI REST automation broker.
///
/// Prints one JSON envelope on standard output and exits 0 on success or 1 on failure.
#[derive(Clone, Debug, Parser)]
#[command(name = "pbi-broker", version, about, long_about = None)]
pub struct Args {
	/// Operation to run.
	#[arg(long, value_enum)]
	pub mode: Mode,
	/// Identity tenant (directory id, domain, or `common`).
	#[arg(long, env = "PBI_TENANT_ID", default_value = "common")]
	pub tenant_id: String,
	/// Target workspace id.
	#[arg(long)]
	pub workspace_id: Option<String>,
	/// Target dataset id.
	#[arg(long)]
	pub dataset_id: Option<String>,
	/// Number of refresh history entries to fetch.
	#[arg(long, default_value_t = ModeRequest::DEFAULT_TOP)]
	pub top: u32,
	/// Emit the unprojected upstream payload.
	#[arg(long)]
	pub raw: bool,
	/// Maximum credential age in hours; values <= 0 keep the provider expiry.
	#[arg(
		long,
		env = "PBI_TOKEN_CACHE_HOURS",
		default_value_t = CachePolicy::DEFAULT_MAX_HOURS,
		allow_negative_numbers = true
	)]
	pub token_cache_hours: i64,
	/// JSON body replacing the refresh schedule (schedule mode only).
	#[arg(long)]
	pub schedule_json: Option<String>,
	/// Take over the dataset before replacing its schedule.
	#[arg(long)]
	pub takeover: bool,
	/// Token cache file [default: pbi_token_cache.json beside the executable].
	#[arg(long, env = "PBI_TOKEN_CACHE")]
	pub token_cache: Option<PathBuf>,
	/// Public client id used for device-code sign-in.
	#[arg(long, env = "PBI_CLIENT_ID", default_value = ServiceDescriptor::DEFAULT_CLIENT_ID)]
	pub client_id: String,
	/// Identity provider host.
	#[arg(long, env = "PBI_AUTHORITY", default_value = ServiceDescriptor::DEFAULT_AUTHORITY)]
	pub authority: String,
	/// Power BI REST base.
	#[arg(long, env = "PBI_API_BASE", default_value = ServiceDescriptor::DEFAULT_API_BASE)]
	pub api_base: String,
	/// Scope requested for the access token.
	#[arg(long, env = "PBI_SCOPE", default_value = ServiceDescriptor::DEFAULT_SCOPE)]
	pub scope: String,
	/// Log debug output to standard error.
	#[arg(short, long)]
	pub verbose: bool,
}
impl Args {
	/// Converts the raw flags into a validated [`ModeRequest`].
	pub fn mode_request(&self) -> Result<ModeRequest, ParameterError> {
		let tenant_id = TenantId::new(&self.tenant_id).map_err(|e| invalid("tenantId", e))?;
		let mut request = ModeRequest::new(self.mode, tenant_id);

		if let Some(raw) = present(self.workspace_id.as_deref()) {
			request = request.with_workspace(WorkspaceId::new(raw).map_err(|e| invalid("workspaceId", e))?);
		}
		if let Some(raw) = present(self.dataset_id.as_deref()) {
			request = request.with_dataset(DatasetId::new(raw).map_err(|e| invalid("datasetId", e))?);
		}
		if let Some(raw) = self.schedule_json.as_deref() {
			request = request.with_schedule_json(raw);
		}

		request.top = self.top;
		request.raw = self.raw;
		request.takeover = self.takeover;

		if request.schedule_json.is_some() && request.mode != Mode::Schedule {
			tracing::debug!(mode = %request.mode, "Ignoring scheduleJson outside schedule mode.");
		}

		Ok(request)
	}

	/// Builds the validated service descriptor for `tenant`.
	pub fn descriptor(&self, tenant: TenantId) -> Result<ServiceDescriptor> {
		let descriptor = ServiceDescriptor::builder(tenant)
			.authority(parse_endpoint("authority", &self.authority)?)
			.api_base(parse_endpoint("api base", &self.api_base)?)
			.client_id(self.client_id.trim())
			.scope(self.scope.trim())
			.build()?;

		Ok(descriptor)
	}

	/// Returns the cache policy derived from `--token-cache-hours`.
	pub fn cache_policy(&self) -> Result<CachePolicy, ParameterError> {
		if self.token_cache_hours > CachePolicy::MAX_HOURS {
			return Err(ParameterError::Invalid {
				name: "tokenCacheHours",
				reason: format!("must not exceed {}", CachePolicy::MAX_HOURS),
			});
		}

		Ok(CachePolicy::new(self.token_cache_hours))
	}

	/// Resolves the token cache path, defaulting to the executable's directory.
	pub fn cache_path(&self) -> Result<PathBuf> {
		match &self.token_cache {
			Some(path) => Ok(path.clone()),
			None => Ok(FileStore::default_path()?),
		}
	}
}

/// Parses `args` (including the program name).
///
/// Help and version requests surface as errors whose [`clap::Error::use_stderr`] is `false`;
/// callers should let clap print those and exit normally.
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	Args::try_parse_from(args)
}

/// Converts a clap parsing failure into a parameter error with a one-line message.
pub fn argument_error(err: &clap::Error) -> ParameterError {
	let rendered = err.to_string();
	let message = rendered
		.lines()
		.find(|line| !line.trim().is_empty())
		.unwrap_or("invalid arguments")
		.trim_start_matches("error: ")
		.to_owned();

	ParameterError::Arguments { message }
}

/// Runs one invocation against the live identity provider and API.
pub async fn run(args: Args) -> Result<Envelope> {
	let request = args.mode_request()?;

	// Fail on bad parameters before touching the cache, the network, or the operator.
	request.plan()?;
	request.takeover_call()?;

	let policy = args.cache_policy()?;
	let descriptor = args.descriptor(request.tenant_id.clone())?;
	let http_client = ReqwestHttpClient::new()?;
	let store = FileStore::new(args.cache_path()?);
	let cache = TokenCache::new(Arc::new(store), policy);
	let sign_in = DeviceCodeSignIn::new(&descriptor, http_client.clone());
	let broker = Broker::new(cache, Arc::new(sign_in));
	let api = ApiClient::new(http_client, descriptor);

	api.dispatch(&broker, &request).await
}

fn present(raw: Option<&str>) -> Option<&str> {
	raw.map(str::trim).filter(|value| !value.is_empty())
}

fn invalid(name: &'static str, err: IdentifierError) -> ParameterError {
	ParameterError::Invalid { name, reason: err.to_string() }
}
