use std::time::Instant;

use tracing::debug;
use wa_runtime::{FailureKind, Operation};

use crate::error::{Result, WaError};
use crate::output::{self, OutputFormat, ResultBuilder, StatusData};
use crate::runtime::RuntimeContext;

pub async fn execute(rt: &RuntimeContext, format: OutputFormat, start: Instant) -> Result<()> {
	let state = rt.monitor.refresh_status().await;
	debug!(target: "wa_cli", phase = %state.phase(), "status refreshed");

	// An unreachable bridge leaves the monitor on its initial state, which
	// would read as a plain "not connected".
	match rt.monitor.last_error() {
		Some(err) if err.operation == Operation::Status && err.kind == FailureKind::Transport => {
			return Err(WaError::Unreachable {
				operation: err.operation,
				message: err.message,
			});
		}
		_ => {}
	}

	let result = ResultBuilder::new("status").started_at(start).data(StatusData::new(state)).build();
	output::print_result(&result, format);
	Ok(())
}
