//! `wa connect`: start pairing and follow the QR flow until linked.

use std::time::Instant;

use tracing::{debug, info};
use wa_protocol::{ConnectionState, LinkPhase};
use wa_runtime::{ConnectOutcome, FastPollEnd, FastPollPhase, Operation};

use crate::cli::ConnectArgs;
use crate::error::{Result, WaError};
use crate::output::{self, ConnectData, OutputFormat, ResultBuilder};
use crate::render;
use crate::runtime::RuntimeContext;

pub async fn execute(rt: &RuntimeContext, args: &ConnectArgs, format: OutputFormat, start: Instant) -> Result<()> {
	let monitor = &rt.monitor;
	let mut states = monitor.subscribe();
	let mut fast_poll = monitor.subscribe_fast_poll();

	let outcome = monitor.connect().await;
	match outcome {
		ConnectOutcome::Rejected { ref message } => {
			return Err(WaError::Rejected {
				operation: Operation::Connect,
				message: message.clone(),
			});
		}
		ConnectOutcome::Unreachable { ref message } => {
			return Err(WaError::Unreachable {
				operation: Operation::Connect,
				message: message.clone(),
			});
		}
		ConnectOutcome::Accepted { .. } | ConnectOutcome::AlreadyInProgress => {}
	}

	// Show the first QR without waiting a full fast-poll interval.
	let state = monitor.refresh_status().await;

	if args.no_wait {
		let result = ResultBuilder::new("connect")
			.started_at(start)
			.data(ConnectData {
				outcome,
				fast_poll: None,
				qr_payloads: state.qr_payload.iter().cloned().collect(),
				phase: state.phase(),
				state,
			})
			.build();
		output::print_result(&result, format);
		return Ok(());
	}

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	let mut qr_payloads: Vec<String> = Vec::new();
	let end = loop {
		let state = states.borrow_and_update().clone();
		note_qr(&state, &mut qr_payloads, format);
		if state.phase() == LinkPhase::Authenticated {
			break FastPollEnd::Authenticated;
		}
		if let FastPollPhase::Ended(end) = *fast_poll.borrow_and_update() {
			break end;
		}

		tokio::select! {
			changed = states.changed() => {
				if changed.is_err() {
					break FastPollEnd::Cancelled;
				}
			}
			changed = fast_poll.changed() => {
				if changed.is_err() {
					break FastPollEnd::Cancelled;
				}
			}
			_ = &mut ctrl_c => {
				info!(target: "wa_cli", "interrupted while waiting for QR scan");
				break FastPollEnd::Cancelled;
			}
		}
	};

	let state = monitor.state();
	debug!(target: "wa_cli", ?end, phase = %state.phase(), qr_rotations = qr_payloads.len(), "pairing follow ended");

	match end {
		FastPollEnd::Authenticated => {
			let result = ResultBuilder::new("connect")
				.started_at(start)
				.data(ConnectData {
					outcome,
					fast_poll: Some(end),
					qr_payloads,
					phase: state.phase(),
					state,
				})
				.build();
			output::print_result(&result, format);
			Ok(())
		}
		FastPollEnd::TimedOut => Err(WaError::PairingTimeout {
			ms: rt.settings.fast_poll_timeout_ms,
			state: Box::new(state),
		}),
		FastPollEnd::Cancelled => Err(WaError::PairingCancelled { state: Box::new(state) }),
	}
}

/// Records a QR payload the first time it is seen; in text mode, prints it
/// so the user can scan while the command keeps waiting.
fn note_qr(state: &ConnectionState, seen: &mut Vec<String>, format: OutputFormat) {
	let Some(ref qr) = state.qr_payload else {
		return;
	};
	if seen.last() == Some(qr) {
		return;
	}
	seen.push(qr.clone());
	if !format.is_machine() {
		println!("{}\n", render::state_panel(state));
	}
}
