// crates.io
use tracing::{Instrument, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::FlowKind};

/// A span builder used by pipeline stages.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("pbi_broker.flow", flow = kind.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
