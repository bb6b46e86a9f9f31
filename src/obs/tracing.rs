// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	obs::{FlowKind, FlowOutcome, record_flow_outcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by gate flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_gate.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Records a callback the middleware refused without contacting the provider.
///
/// Emits a `warn` event (feature `tracing`) and bumps the `rejected` outcome counter.
pub fn record_rejection(provider: &ProviderId, reason: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(provider = provider.as_ref(), reason, "Rejected OAuth callback.");
	#[cfg(not(feature = "tracing"))]
	let _ = (provider, reason);

	record_flow_outcome(FlowKind::AuthorizationCode, FlowOutcome::Rejected);
}

/// Logs a failure whose details are hidden from the HTTP response.
pub fn record_failure(provider: &ProviderId, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::error!(provider = provider.as_ref(), error = %error, "OAuth login failed.");
	#[cfg(not(feature = "tracing"))]
	let _ = (provider, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn flow_span_instruments_without_subscriber() {
		let span = FlowSpan::new(FlowKind::Profile, "test");

		assert_eq!(span.instrument(async { 7 }).await, 7);
	}

	#[test]
	fn rejection_is_recorded_without_subscriber() {
		let provider = ProviderId::new("github").expect("Provider fixture should be valid.");

		record_rejection(&provider, "state mismatch");
		record_failure(&provider, &Error::StateMismatch);
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::TokenExchange, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
