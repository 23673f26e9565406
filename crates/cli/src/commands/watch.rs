//! `wa watch`: background polling with one record per state change or
//! bridge failure.

use anyhow::Context;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};
use wa_runtime::config::as_millis;

use crate::cli::WatchArgs;
use crate::error::Result;
use crate::output::{self, OutputFormat, ResultBuilder, StateChangeData};
use crate::runtime::RuntimeContext;

pub async fn execute(rt: &RuntimeContext, args: &WatchArgs, format: OutputFormat) -> Result<()> {
	let monitor = &rt.monitor;
	let mut states = WatchStream::from_changes(monitor.subscribe());
	let mut errors = WatchStream::from_changes(monitor.subscribe_errors());
	monitor.start_default_polling();
	info!(target: "wa_cli", interval_ms = as_millis(monitor.config().poll_interval), "watching bridge status");

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	let mut seq = 0u64;
	let mut last = None;
	loop {
		// A failed refresh leaves the state untouched, so errors need their own stream.
		let (state, last_error) = tokio::select! {
			biased;
			signal = &mut ctrl_c => {
				signal.context("failed to listen for Ctrl-C")?;
				break;
			}
			next = states.next() => {
				let Some(state) = next else { break };
				(state, monitor.last_error())
			}
			next = errors.next() => {
				let Some(error) = next else { break };
				if let Some(ref err) = error {
					debug!(target: "wa_cli", %err, "bridge failure");
				}
				(monitor.state(), error)
			}
		};

		let record = (state, last_error);
		if !args.all && last.as_ref() == Some(&record) {
			continue;
		}
		last = Some(record.clone());
		let (state, last_error) = record;
		seq += 1;

		let result = ResultBuilder::new("watch")
			.data(StateChangeData {
				seq,
				phase: state.phase(),
				state,
				last_error,
			})
			.build();
		output::print_result(&result, format);
	}

	monitor.shutdown();
	info!(target: "wa_cli", records = seq, "watch stopped");
	Ok(())
}
