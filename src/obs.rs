//! Optional observability helpers for context resolution, token acquisition, and outbound calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_client_context.op` with the `op`
//!   (operation), `stage` (call site), `scope` (session or request) and `outcome` fields.
//! - Enable `metrics` to increment the `oauth2_client_context_op_total` counter, labeled by
//!   `op`, `scope` and `outcome`.
//!
//! A pending user redirect is reported as its own outcome rather than as a failure: it is the
//! normal first step of the authorization-code grant.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, context::ScopeMode};

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Producing a client context for an inbound request.
	ResolveContext,
	/// Authorization-code acquisition against the token endpoint.
	AcquireToken,
	/// Outbound call through the OAuth2-aware client.
	OutboundCall,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::ResolveContext => "resolve_context",
			OpKind::AcquireToken => "acquire_token",
			OpKind::OutboundCall => "outbound_call",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// The user agent must be redirected to the authorization endpoint first.
	Redirect,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Redirect => "redirect",
			OpOutcome::Failure => "failure",
		}
	}

	/// Classifies the result of a completed operation.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => OpOutcome::Success,
			Err(Error::UserRedirectRequired { .. }) => OpOutcome::Redirect,
			Err(_) => OpOutcome::Failure,
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Closes an operation: tags `span` with the outcome and bumps the counter.
pub fn finish_op<T>(span: &OpSpan, kind: OpKind, scope: ScopeMode, result: &Result<T>) {
	let outcome = OpOutcome::of(result);

	span.record_outcome(outcome);
	record_op_outcome(kind, scope, outcome);
}
