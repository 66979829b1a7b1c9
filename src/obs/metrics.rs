// self
use crate::{
	context::ScopeMode,
	obs::{OpKind, OpOutcome},
};

/// Bumps `oauth2_client_context_op_total` for one operation event (when `metrics` is enabled).
pub fn record_op_outcome(kind: OpKind, scope: ScopeMode, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_client_context_op_total",
			"op" => kind.as_str(),
			"scope" => scope.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, scope, outcome);
	}
}
