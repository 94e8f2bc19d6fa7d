// std
use std::io;
// crates.io
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "PBI_LOG";

/// Installs the global stderr subscriber.
///
/// `verbose` forces `debug`; otherwise [`LOG_ENV`] applies, falling back to `warn`.
/// Standard output stays reserved for the JSON envelope.
pub fn init_logging(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	// A subscriber may already be installed when embedded; keep it.
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.try_init();
}
