//! Connection monitor: polls bridge status and drives the QR pairing flow.
//!
//! The monitor owns the current [`ConnectionState`] and publishes it through a
//! [`watch`] channel. Every successful status check replaces the snapshot in a
//! single `send_replace`, so readers never observe a half-updated state, and
//! concurrent writers (background poll, fast poll, explicit refresh) are
//! last-write-wins.
//!
//! # Timers
//!
//! - **Background poll**: [`ConnectionMonitor::start_background_polling`], one
//!   refresh per interval for the life of the session. Restarting replaces the
//!   previous timer.
//! - **Fast poll**: entered when the bridge accepts [`ConnectionMonitor::connect`].
//!   Refreshes every `fast_poll_interval` until the device is authenticated or
//!   `fast_poll_timeout` has elapsed since acceptance. A tick that would land
//!   exactly on the timeout does not fire.
//!
//! Recorded failures are published on a second channel
//! ([`ConnectionMonitor::subscribe_errors`]) because a failed status check
//! leaves the state snapshot untouched.
//!
//! Both timers run as tokio tasks holding a child of the monitor's root
//! [`CancellationToken`] and only a weak reference to the monitor, so
//! [`ConnectionMonitor::shutdown`] or dropping the last handle stops them.

mod poller;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wa_protocol::ConnectionState;

use crate::bridge::BridgeControl;
use crate::config::{MIN_POLL_INTERVAL, MonitorConfig};
use crate::error::{MonitorError, Operation};

/// Result of a [`ConnectionMonitor::connect`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectOutcome {
	/// The bridge accepted; the fast-poll sub-phase is running.
	Accepted { message: String },
	/// A connect request or fast-poll sub-phase was already active; nothing was sent.
	AlreadyInProgress,
	/// The bridge answered `success: false`.
	Rejected { message: String },
	/// The bridge could not be reached.
	Unreachable { message: String },
}

/// Result of a [`ConnectionMonitor::disconnect`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectReport {
	pub outcome: DisconnectOutcome,
	/// State after the reconciling refresh.
	pub state: ConnectionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DisconnectOutcome {
	Accepted { message: String },
	Rejected { message: String },
	Unreachable { message: String },
}

/// Why a fast-poll sub-phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FastPollEnd {
	/// A poll observed `authenticated = true`.
	Authenticated,
	/// The timeout elapsed without authentication.
	TimedOut,
	/// Stopped by disconnect or shutdown.
	Cancelled,
}

/// Fast-poll sub-phase progress, observable via [`ConnectionMonitor::subscribe_fast_poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "end", rename_all = "snake_case")]
pub enum FastPollPhase {
	Idle,
	Polling,
	Ended(FastPollEnd),
}

struct FastPollSlot {
	id: u64,
	cancel: CancellationToken,
}

pub(crate) struct Inner {
	bridge: Arc<dyn BridgeControl>,
	config: MonitorConfig,
	state_tx: watch::Sender<ConnectionState>,
	fast_poll_tx: watch::Sender<FastPollPhase>,
	/// Held for the duration of one status call; coalesces overlapping refreshes.
	refresh_gate: tokio::sync::Mutex<()>,
	error_tx: watch::Sender<Option<MonitorError>>,
	connecting: AtomicBool,
	disconnecting: AtomicBool,
	root: CancellationToken,
	background: Mutex<Option<CancellationToken>>,
	fast_poll: Mutex<Option<FastPollSlot>>,
	next_fast_poll_id: AtomicU64,
	/// Bumped by `disconnect` and `shutdown`; a connect accepted across a
	/// bump does not start fast polling.
	epoch: AtomicU64,
}

impl Drop for Inner {
	fn drop(&mut self) {
		self.root.cancel();
	}
}

impl Inner {
	pub(crate) async fn refresh(&self) -> ConnectionState {
		let _guard = match self.refresh_gate.try_lock() {
			Ok(guard) => guard,
			Err(_) => {
				// Another refresh is in flight: wait for it and share its result.
				drop(self.refresh_gate.lock().await);
				return self.state_tx.borrow().clone();
			}
		};

		match self.bridge.connection_status().await {
			Ok(_) if self.root.is_cancelled() => self.state_tx.borrow().clone(),
			Ok(reported) => {
				let state = reported.normalized();
				self.clear_error(Operation::Status);
				let previous = self.state_tx.send_replace(state.clone());
				if previous.phase() != state.phase() {
					info!(target: "wa.monitor", from = ?previous.phase(), to = ?state.phase(), status = %state.status_message, "link phase changed");
				}
				state
			}
			Err(err) => {
				self.record(MonitorError::from_error(Operation::Status, &err));
				self.state_tx.borrow().clone()
			}
		}
	}

	fn record(&self, error: MonitorError) {
		warn!(target: "wa.monitor", kind = ?error.kind, operation = %error.operation, message = %error.message, "bridge call failed");
		self.error_tx.send_replace(Some(error));
	}

	fn clear_error(&self, operation: Operation) {
		self.error_tx.send_if_modified(|last| {
			if last.as_ref().is_some_and(|e| e.operation == operation) {
				*last = None;
				true
			} else {
				false
			}
		});
	}

	/// Clears the fast-poll slot if it still belongs to `id`.
	fn finish_fast_poll(&self, id: u64, end: FastPollEnd) {
		let mut slot = self.fast_poll.lock();
		if slot.as_ref().is_some_and(|s| s.id == id) {
			*slot = None;
			self.connecting.store(false, Ordering::Release);
			self.fast_poll_tx.send_replace(FastPollPhase::Ended(end));
			debug!(target: "wa.monitor", ?end, "fast poll finished");
		}
	}

	fn cancel_fast_poll(&self) {
		self.epoch.fetch_add(1, Ordering::AcqRel);
		if let Some(slot) = self.fast_poll.lock().take() {
			slot.cancel.cancel();
			self.connecting.store(false, Ordering::Release);
			self.fast_poll_tx.send_replace(FastPollPhase::Ended(FastPollEnd::Cancelled));
			debug!(target: "wa.monitor", "fast poll cancelled");
		}
	}
}

/// Clears `connecting` on drop unless disarmed, so a `connect` future
/// dropped mid-request does not leave the flag set.
struct ConnectingGuard<'a> {
	flag: &'a AtomicBool,
	armed: bool,
}

impl ConnectingGuard<'_> {
	fn disarm(mut self) {
		self.armed = false;
	}
}

impl Drop for ConnectingGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			self.flag.store(false, Ordering::Release);
		}
	}
}

/// Tracks and drives the bridge's link/pairing lifecycle.
///
/// Cloning yields another handle to the same monitor.
#[derive(Clone)]
pub struct ConnectionMonitor {
	inner: Arc<Inner>,
}

impl ConnectionMonitor {
	/// Creates a monitor in the `not_connected` state. No timers run until
	/// [`start_background_polling`](Self::start_background_polling) or
	/// [`connect`](Self::connect) is called.
	pub fn new(bridge: Arc<dyn BridgeControl>, config: MonitorConfig) -> Self {
		let (state_tx, _) = watch::channel(ConnectionState::not_connected());
		let (fast_poll_tx, _) = watch::channel(FastPollPhase::Idle);
		let (error_tx, _) = watch::channel(None);
		Self {
			inner: Arc::new(Inner {
				bridge,
				config: config.clamped(),
				state_tx,
				fast_poll_tx,
				refresh_gate: tokio::sync::Mutex::new(()),
				error_tx,
				connecting: AtomicBool::new(false),
				disconnecting: AtomicBool::new(false),
				root: CancellationToken::new(),
				background: Mutex::new(None),
				fast_poll: Mutex::new(None),
				next_fast_poll_id: AtomicU64::new(1),
				epoch: AtomicU64::new(0),
			}),
		}
	}

	pub fn config(&self) -> &MonitorConfig {
		&self.inner.config
	}

	/// Current state snapshot.
	pub fn state(&self) -> ConnectionState {
		self.inner.state_tx.borrow().clone()
	}

	/// Receiver that yields every replaced state snapshot.
	pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
		self.inner.state_tx.subscribe()
	}

	pub fn subscribe_fast_poll(&self) -> watch::Receiver<FastPollPhase> {
		self.inner.fast_poll_tx.subscribe()
	}

	/// Most recent recorded failure. A status-check failure is cleared by the
	/// next successful status check; connect/disconnect failures are cleared
	/// when that operation is next attempted.
	pub fn last_error(&self) -> Option<MonitorError> {
		self.inner.error_tx.borrow().clone()
	}

	/// Receiver notified on every recorded failure and every clear.
	pub fn subscribe_errors(&self) -> watch::Receiver<Option<MonitorError>> {
		self.inner.error_tx.subscribe()
	}

	/// True from a `connect` call until its fast-poll sub-phase ends.
	pub fn is_connecting(&self) -> bool {
		self.inner.connecting.load(Ordering::Acquire)
	}

	pub fn is_disconnecting(&self) -> bool {
		self.inner.disconnecting.load(Ordering::Acquire)
	}

	pub fn is_fast_polling(&self) -> bool {
		*self.inner.fast_poll_tx.borrow() == FastPollPhase::Polling
	}

	pub fn is_background_polling(&self) -> bool {
		self.inner.background.lock().as_ref().is_some_and(|t| !t.is_cancelled())
	}

	/// Fetches status from the bridge and replaces the held state.
	///
	/// On failure the previous state is kept and the error recorded; this
	/// never fails. Returns the state current after the call.
	pub async fn refresh_status(&self) -> ConnectionState {
		self.inner.refresh().await
	}

	/// Starts refreshing every `interval`, first tick immediately. Any
	/// previously started background timer is cancelled first.
	pub fn start_background_polling(&self, interval: Duration) {
		let interval = interval.max(MIN_POLL_INTERVAL);
		let token = self.inner.root.child_token();
		if let Some(previous) = self.inner.background.lock().replace(token.clone()) {
			previous.cancel();
			debug!(target: "wa.monitor", "replaced background poll timer");
		}

		info!(target: "wa.monitor", interval_ms = crate::config::as_millis(interval), "background polling started");
		tokio::spawn(poller::run_background(Arc::downgrade(&self.inner), interval, token));
	}

	/// Starts background polling at the configured interval.
	pub fn start_default_polling(&self) {
		self.start_background_polling(self.inner.config.poll_interval);
	}

	pub fn stop_background_polling(&self) {
		if let Some(token) = self.inner.background.lock().take() {
			token.cancel();
			info!(target: "wa.monitor", "background polling stopped");
		}
	}

	/// Asks the bridge to start pairing and, if accepted, enters the
	/// fast-poll sub-phase.
	///
	/// While a connect request or fast-poll sub-phase is active this returns
	/// [`ConnectOutcome::AlreadyInProgress`] without contacting the bridge.
	///
	/// Dropping the returned future before it completes leaves no sub-phase
	/// behind and a later call goes through. If `disconnect` or `shutdown`
	/// runs while the request is in flight, an accepted reply does not start
	/// fast polling.
	pub async fn connect(&self) -> ConnectOutcome {
		if self
			.inner
			.connecting
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			debug!(target: "wa.monitor", "connect ignored: already in progress");
			return ConnectOutcome::AlreadyInProgress;
		}
		let guard = ConnectingGuard {
			flag: &self.inner.connecting,
			armed: true,
		};
		let epoch = self.inner.epoch.load(Ordering::Acquire);
		self.inner.clear_error(Operation::Connect);

		match self.inner.bridge.initiate_connection().await {
			Ok(response) if response.success => {
				if self.start_fast_poll(Instant::now(), epoch) {
					info!(target: "wa.monitor", message = %response.message, "connect accepted, fast polling");
					guard.disarm();
				} else {
					info!(target: "wa.monitor", message = %response.message, "connect accepted after disconnect, not fast polling");
					self.inner.fast_poll_tx.send_replace(FastPollPhase::Ended(FastPollEnd::Cancelled));
				}
				ConnectOutcome::Accepted {
					message: response.message,
				}
			}
			Ok(response) => {
				self.inner.record(MonitorError::rejected(Operation::Connect, response.message.clone()));
				ConnectOutcome::Rejected {
					message: response.message,
				}
			}
			Err(err) => {
				let recorded = MonitorError::from_error(Operation::Connect, &err);
				let message = recorded.message.clone();
				self.inner.record(recorded);
				ConnectOutcome::Unreachable { message }
			}
		}
	}

	/// Installs and spawns the fast-poll task unless `epoch` is stale or the
	/// monitor is shut down. Returns whether polling started.
	fn start_fast_poll(&self, accepted_at: Instant, epoch: u64) -> bool {
		let id = self.inner.next_fast_poll_id.fetch_add(1, Ordering::Relaxed);
		let token = self.inner.root.child_token();
		{
			// Checked under the slot lock: `cancel_fast_poll` bumps the epoch
			// before taking it, so either we see the bump or it sees our slot.
			let mut slot = self.inner.fast_poll.lock();
			if self.inner.epoch.load(Ordering::Acquire) != epoch || self.inner.root.is_cancelled() {
				return false;
			}
			*slot = Some(FastPollSlot {
				id,
				cancel: token.clone(),
			});
			self.inner.fast_poll_tx.send_replace(FastPollPhase::Polling);
		}

		let weak = Arc::downgrade(&self.inner);
		let schedule = poller::FastPollSchedule {
			accepted_at,
			interval: self.inner.config.fast_poll_interval,
			timeout: self.inner.config.fast_poll_timeout,
		};
		tokio::spawn(async move {
			let end = poller::run_fast_poll(weak.clone(), schedule, token).await;
			if let Some(inner) = weak.upgrade() {
				inner.finish_fast_poll(id, end);
			}
		});
		true
	}

	/// Asks the bridge to disconnect, then reconciles state with one refresh.
	///
	/// The refresh happens whether the bridge accepted, rejected, or could
	/// not be reached. Any running fast-poll sub-phase is cancelled.
	pub async fn disconnect(&self) -> DisconnectReport {
		self.inner.disconnecting.store(true, Ordering::Release);
		self.inner.clear_error(Operation::Disconnect);
		self.inner.cancel_fast_poll();

		let outcome = match self.inner.bridge.disconnect().await {
			Ok(response) if response.success => {
				info!(target: "wa.monitor", message = %response.message, "disconnect accepted");
				DisconnectOutcome::Accepted {
					message: response.message,
				}
			}
			Ok(response) => {
				self.inner.record(MonitorError::rejected(Operation::Disconnect, response.message.clone()));
				DisconnectOutcome::Rejected {
					message: response.message,
				}
			}
			Err(err) => {
				let recorded = MonitorError::from_error(Operation::Disconnect, &err);
				let message = recorded.message.clone();
				self.inner.record(recorded);
				DisconnectOutcome::Unreachable { message }
			}
		};

		let state = self.inner.refresh().await;
		self.inner.disconnecting.store(false, Ordering::Release);
		DisconnectReport { outcome, state }
	}

	/// Ends the session: cancels both timers and resets state to
	/// `not_connected`. Timers started on this monitor afterwards exit
	/// immediately.
	pub fn shutdown(&self) {
		self.inner.root.cancel();
		self.inner.background.lock().take();
		self.inner.cancel_fast_poll();
		self.inner.state_tx.send_replace(ConnectionState::not_connected());
		info!(target: "wa.monitor", "monitor shut down");
	}

	pub fn is_shut_down(&self) -> bool {
		self.inner.root.is_cancelled()
	}
}

impl std::fmt::Debug for ConnectionMonitor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConnectionMonitor")
			.field("state", &*self.inner.state_tx.borrow())
			.field("connecting", &self.is_connecting())
			.field("disconnecting", &self.is_disconnecting())
			.field("config", &self.inner.config)
			.finish()
	}
}
