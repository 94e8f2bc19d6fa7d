//! `pbi-broker` binary: one JSON envelope on standard output, exit code 0 or 1.

// std
use std::{env, process::ExitCode};
// self
use pbi_broker::{cli, envelope::ErrorEnvelope, error::Error, obs};

#[tokio::main]
async fn main() -> ExitCode {
	let args = match cli::parse_args(env::args_os()) {
		Ok(args) => args,
		Err(e) if !e.use_stderr() => e.exit(),
		Err(e) => return fail(&Error::from(cli::argument_error(&e))),
	};

	obs::init_logging(args.verbose);

	match cli::run(args).await {
		Ok(envelope) => {
			println!("{}", envelope.to_json_string());

			ExitCode::SUCCESS
		},
		Err(e) => fail(&e),
	}
}

fn fail(error: &Error) -> ExitCode {
	tracing::debug!(category = error.category(), "Invocation failed.");
	println!("{}", ErrorEnvelope::from(error).to_json_string());

	ExitCode::FAILURE
}
