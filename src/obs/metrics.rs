// self
use crate::{
	auth::Tier,
	obs::{OpKind, OpOutcome},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"duo_connector_operation_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a signed token of `tier` that failed to open.
pub fn record_token_rejection(tier: Tier) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("duo_connector_token_rejected_total", "tier" => tier.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = tier;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_op_outcome_noop_without_metrics() {
		record_op_outcome(OpKind::VerifyResponse, OpOutcome::Failure);
	}

	#[test]
	fn record_token_rejection_noop_without_metrics() {
		record_token_rejection(Tier::Service);
		record_token_rejection(Tier::Application);
	}
}
