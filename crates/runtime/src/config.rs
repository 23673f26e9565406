//! Timing configuration for the connection monitor.

use std::time::Duration;

/// Background status poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);

/// Status poll cadence while waiting for a QR scan after `connect`.
pub const DEFAULT_FAST_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

/// How long the fast-poll sub-phase may run before it stops on its own.
pub const DEFAULT_FAST_POLL_TIMEOUT: Duration = Duration::from_millis(180_000);

/// Intervals shorter than this are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
	pub poll_interval: Duration,
	pub fast_poll_interval: Duration,
	pub fast_poll_timeout: Duration,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			poll_interval: DEFAULT_POLL_INTERVAL,
			fast_poll_interval: DEFAULT_FAST_POLL_INTERVAL,
			fast_poll_timeout: DEFAULT_FAST_POLL_TIMEOUT,
		}
	}
}

impl MonitorConfig {
	/// Builds a config from millisecond values, falling back to the defaults
	/// for any that are `None`.
	pub fn from_millis(poll: Option<u64>, fast_poll: Option<u64>, fast_poll_timeout: Option<u64>) -> Self {
		let defaults = Self::default();
		Self {
			poll_interval: poll.map(Duration::from_millis).unwrap_or(defaults.poll_interval),
			fast_poll_interval: fast_poll.map(Duration::from_millis).unwrap_or(defaults.fast_poll_interval),
			fast_poll_timeout: fast_poll_timeout.map(Duration::from_millis).unwrap_or(defaults.fast_poll_timeout),
		}
		.clamped()
	}

	/// Raises both poll intervals to at least [`MIN_POLL_INTERVAL`].
	pub fn clamped(self) -> Self {
		Self {
			poll_interval: self.poll_interval.max(MIN_POLL_INTERVAL),
			fast_poll_interval: self.fast_poll_interval.max(MIN_POLL_INTERVAL),
			fast_poll_timeout: self.fast_poll_timeout,
		}
	}
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn as_millis(duration: Duration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_dashboard_cadence() {
		let config = MonitorConfig::default();
		assert_eq!(config.poll_interval.as_millis(), 5_000);
		assert_eq!(config.fast_poll_interval.as_millis(), 2_000);
		assert_eq!(config.fast_poll_timeout.as_millis(), 180_000);
	}

	#[test]
	fn from_millis_overrides_and_clamps() {
		let config = MonitorConfig::from_millis(Some(1_000), Some(0), None);
		assert_eq!(config.poll_interval, Duration::from_secs(1));
		assert_eq!(config.fast_poll_interval, MIN_POLL_INTERVAL);
		assert_eq!(config.fast_poll_timeout, DEFAULT_FAST_POLL_TIMEOUT);
	}

	#[test]
	fn as_millis_saturates() {
		assert_eq!(as_millis(Duration::from_millis(2_500)), 2_500);
		assert_eq!(as_millis(Duration::MAX), u64::MAX);
	}
}
