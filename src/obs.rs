//! Optional observability helpers for connector operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `duo_connector.op` with the `op` and `stage`
//!   fields, plus a `debug` event describing each failure. Token verification spans also carry
//!   the `tier` of the token being opened.
//! - Enable `metrics` to increment the `duo_connector_operation_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and `duo_connector_token_rejected_total`
//!   for every signed token that fails to open, labeled by `tier`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Token generation for the verifier redirect.
	SignRequest,
	/// Verification of the verifier's signed response.
	VerifyResponse,
	/// Signed admin API call.
	AdminCall,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::SignRequest => "sign_request",
			OpKind::VerifyResponse => "verify_response",
			OpKind::AdminCall => "admin_call",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a connector operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs a synchronous operation inside its span and records the outcome.
pub(crate) fn observe<T, E>(
	kind: OpKind,
	stage: &'static str,
	op: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
	E: Display,
{
	let _guard = OpSpan::new(kind, stage).entered();

	record_op_outcome(kind, OpOutcome::Attempt);

	let result = op();

	record_result(kind, &result);

	result
}

/// Records the outcome of a finished operation.
pub(crate) fn record_result<T, E>(kind: OpKind, result: &Result<T, E>)
where
	E: Display,
{
	match result {
		Ok(_) => record_op_outcome(kind, OpOutcome::Success),
		Err(e) => {
			record_op_outcome(kind, OpOutcome::Failure);
			trace_failure(kind, e);
		},
	}
}
