//! Injectable time source for token expiry and request timestamps.

// self
use crate::_prelude::*;

/// Supplies the current time to the connector.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;

	/// Returns the current instant in whole epoch seconds.
	fn unix_timestamp(&self) -> i64 {
		self.now().unix_timestamp()
	}
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub OffsetDateTime);
impl FixedClock {
	/// Freezes the clock at `secs` epoch seconds.
	pub fn at_unix(secs: i64) -> Self {
		Self(OffsetDateTime::UNIX_EPOCH + Duration::seconds(secs))
	}
}
impl Clock for FixedClock {
	fn now(&self) -> OffsetDateTime {
		self.0
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn fixed_clock_reports_its_instant() {
		let clock = FixedClock::at_unix(1_300);

		assert_eq!(clock.unix_timestamp(), 1_300);
		assert_eq!(clock.now(), OffsetDateTime::UNIX_EPOCH + Duration::seconds(1_300));
	}

	#[test]
	fn system_clock_is_after_epoch() {
		assert!(SystemClock.unix_timestamp() > 0);
	}
}
