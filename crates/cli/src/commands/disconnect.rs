use std::time::Instant;

use wa_runtime::{DisconnectOutcome, Operation};

use crate::error::{Result, WaError};
use crate::output::{self, DisconnectData, OutputFormat, ResultBuilder};
use crate::runtime::RuntimeContext;

pub async fn execute(rt: &RuntimeContext, format: OutputFormat, start: Instant) -> Result<()> {
	let report = rt.monitor.disconnect().await;

	match report.outcome {
		DisconnectOutcome::Accepted { .. } => {
			let result = ResultBuilder::new("disconnect")
				.started_at(start)
				.monitor_error(rt.monitor.last_error().as_ref())
				.data(DisconnectData {
					phase: report.state.phase(),
					outcome: report.outcome,
					state: report.state,
				})
				.build();
			output::print_result(&result, format);
			Ok(())
		}
		DisconnectOutcome::Rejected { message } => Err(WaError::Rejected {
			operation: Operation::Disconnect,
			message,
		}),
		DisconnectOutcome::Unreachable { message } => Err(WaError::Unreachable {
			operation: Operation::Disconnect,
			message,
		}),
	}
}
