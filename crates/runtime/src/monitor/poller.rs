//! Timer loops behind background and fast polling.

use std::sync::Weak;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{FastPollEnd, Inner};

/// Fixed-cadence refresh loop; exits when cancelled or the monitor is gone.
pub(super) async fn run_background(inner: Weak<Inner>, interval: Duration, cancel: CancellationToken) {
	let mut ticker = time::interval(interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			biased;
			() = cancel.cancelled() => break,
			_ = ticker.tick() => {}
		}

		let Some(monitor) = inner.upgrade() else { break };
		tokio::select! {
			biased;
			() = cancel.cancelled() => break,
			_ = monitor.refresh() => {}
		}
		trace!(target: "wa.monitor", "background tick");
	}
}

#[derive(Debug, Clone, Copy)]
pub(super) struct FastPollSchedule {
	pub accepted_at: Instant,
	pub interval: Duration,
	pub timeout: Duration,
}

impl FastPollSchedule {
	fn deadline(&self) -> Instant {
		self.accepted_at + self.timeout
	}
}

/// Refreshes at `accepted_at + k * interval` for k = 1, 2, ... until a
/// refresh reports `authenticated`, the deadline is reached, or `cancel` fires.
///
/// A tick scheduled at or after the deadline is never issued.
pub(super) async fn run_fast_poll(inner: Weak<Inner>, schedule: FastPollSchedule, cancel: CancellationToken) -> FastPollEnd {
	let deadline = schedule.deadline();
	let mut next = schedule.accepted_at + schedule.interval;

	loop {
		if next >= deadline {
			return FastPollEnd::TimedOut;
		}

		tokio::select! {
			biased;
			() = cancel.cancelled() => return FastPollEnd::Cancelled,
			() = time::sleep_until(next) => {}
		}

		let Some(monitor) = inner.upgrade() else {
			return FastPollEnd::Cancelled;
		};
		let state = tokio::select! {
			biased;
			() = cancel.cancelled() => return FastPollEnd::Cancelled,
			state = monitor.refresh() => state,
		};
		drop(monitor);

		if state.authenticated {
			return FastPollEnd::Authenticated;
		}

		// Skip ticks a slow refresh ran past instead of firing them in a burst.
		let now = Instant::now();
		next += schedule.interval;
		while next <= now {
			next += schedule.interval;
		}
	}
}
