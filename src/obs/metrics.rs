//! Counters exported through the `metrics` facade when the `metrics` feature is on.
//!
//! - `pbi_broker_flow_total{flow, outcome}` counts pipeline stage attempts and results.
//! - `pbi_broker_dispatch_total{method, status}` counts REST calls by verb and status class.

// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a pipeline stage outcome.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"pbi_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a finished REST call. `status` is `None` when no response arrived.
pub fn record_dispatch_status(method: &'static str, status: Option<u16>) {
	let class = status_class(status);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("pbi_broker_dispatch_total", "method" => method, "status" => class)
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, class);
	}
}

fn status_class(status: Option<u16>) -> &'static str {
	match status {
		None => "transport",
		Some(200..=299) => "2xx",
		Some(300..=399) => "3xx",
		Some(400..=499) => "4xx",
		Some(500..=599) => "5xx",
		Some(_) => "other",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn statuses_collapse_into_classes() {
		assert_eq!(status_class(Some(202)), "2xx");
		assert_eq!(status_class(Some(401)), "4xx");
		assert_eq!(status_class(Some(503)), "5xx");
		assert_eq!(status_class(Some(99)), "other");
		assert_eq!(status_class(None), "transport");
	}

	#[test]
	fn recording_without_recorder_is_harmless() {
		record_flow_outcome(FlowKind::SignIn, FlowOutcome::Failure);
		record_dispatch_status("PATCH", Some(200));
	}
}
