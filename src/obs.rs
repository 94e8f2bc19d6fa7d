//! Observability helpers for the broker pipeline.
//!
//! - [`FlowSpan`] emits structured spans named `pbi_broker.flow` with the `flow` (pipeline
//!   stage) and `stage` (call site) fields.
//! - Enable the `metrics` feature to increment the `pbi_broker_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and `pbi_broker_dispatch_total`
//!   for every REST call, labeled by `method` + `status` class.
//! - [`init_logging`] installs the stderr subscriber used by the binary.

mod metrics;
mod subscriber;
mod tracing;

pub use metrics::*;
pub use subscriber::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline stages observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Bearer header acquisition (cache read, sign-in, cache write).
	Acquire,
	/// Interactive sign-in against the identity provider.
	SignIn,
	/// Single REST call against the Power BI API.
	Dispatch,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Acquire => "acquire",
			FlowKind::SignIn => "sign_in",
			FlowKind::Dispatch => "dispatch",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a pipeline stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_snake_case() {
		assert_eq!(FlowKind::SignIn.to_string(), "sign_in");
		assert_eq!(FlowOutcome::Failure.to_string(), "failure");
	}
}
