// self
use crate::{
	_prelude::*,
	context::ScopeMode,
	obs::{OpKind, OpOutcome},
};

/// Future returned by [`OpSpan::instrument`]; the bare future when `tracing` is off.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`OpSpan::instrument`]; the bare future when `tracing` is off.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// `oauth2_client_context.op` span around one context resolution, acquisition, or outbound call.
///
/// The `outcome` field starts empty and is filled by [`OpSpan::record_outcome`] once the
/// operation settles.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Opens a span for `kind` at call site `stage` within a context of the given scope.
	pub fn new(kind: OpKind, stage: &'static str, scope: ScopeMode) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"oauth2_client_context.op",
					op = kind.as_str(),
					stage,
					scope = scope.as_str(),
					outcome = tracing::field::Empty,
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage, scope);

			Self {}
		}
	}

	/// Fills the `outcome` field.
	pub fn record_outcome(&self, outcome: OpOutcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());
		#[cfg(not(feature = "tracing"))]
		let _ = outcome;
	}

	/// Enters the span for a synchronous section.
	pub fn entered(&self) -> OpSpanGuard<'_> {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { _entered: self.span.enter() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			OpSpanGuard { _span: self }
		}
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Guard returned by [`OpSpan::entered`]; leaves the span on drop.
pub struct OpSpanGuard<'a> {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::Entered<'a>,
	#[cfg(not(feature = "tracing"))]
	_span: &'a OpSpan,
}
impl Debug for OpSpanGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Debug event inside the current span; compiled out without `tracing`.
macro_rules! op_event {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::debug!($($arg)*);
		}
	};
}
pub(crate) use op_event;
