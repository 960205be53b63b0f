// self
use crate::{_prelude::*, auth::Tier, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by connector operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"duo_connector.op",
				op = kind.as_str(),
				stage,
				tier = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Records which token tier the span is working on.
	pub fn with_tier(self, tier: Tier) -> Self {
		#[cfg(feature = "tracing")]
		{
			self.span.record("tier", tier.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = tier;
		}

		self
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits a `debug` event describing a failed operation. Error messages never carry key material.
pub fn trace_failure(kind: OpKind, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = kind.as_str(), error = %error, "Connector operation failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

/// Emits a `debug` event for a token of `tier` that failed to open.
pub fn trace_token_rejection(tier: Tier, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(tier = tier.as_str(), error = %error, "Signed token rejected.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (tier, error);
	}
}
