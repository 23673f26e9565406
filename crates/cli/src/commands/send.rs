use std::time::Instant;

use wa_protocol::SendMessageRequest;

use crate::cli::SendArgs;
use crate::error::{Result, WaError};
use crate::output::{self, OutputFormat, ResultBuilder, SendData};
use crate::runtime::RuntimeContext;

pub async fn execute(rt: &RuntimeContext, args: SendArgs, format: OutputFormat, start: Instant) -> Result<()> {
	let request = SendMessageRequest {
		recipient: args.recipient,
		message: args.message,
		media_path: args.media,
	};
	request.validate().map_err(WaError::InvalidInput)?;

	let response = rt.client.send_message(&request).await?;

	let result = ResultBuilder::new("send")
		.started_at(start)
		.data(SendData {
			recipient: request.recipient,
			message: request.message,
			media_path: request.media_path,
			bridge_message: response.message,
		})
		.build();
	output::print_result(&result, format);
	Ok(())
}
