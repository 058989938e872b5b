// self
use crate::{_prelude::*, obs::TokenOutcome};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFuture<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFuture<F> = F;

/// A span builder used around token acquisition.
#[derive(Clone, Debug)]
pub struct CredentialSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CredentialSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("spotify_mcp.credentials", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFuture<Fut>
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

/// Emits one event for `outcome`; `detail` must never contain secret material.
pub fn log_token_outcome(outcome: TokenOutcome, detail: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		match outcome {
			TokenOutcome::CacheHit => tracing::debug!(outcome = outcome.as_str(), "{detail}"),
			TokenOutcome::Refresh => tracing::info!(outcome = outcome.as_str(), "{detail}"),
			TokenOutcome::Failure => tracing::warn!(outcome = outcome.as_str(), "{detail}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, detail);
	}
}
