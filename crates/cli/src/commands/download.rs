use std::time::Instant;

use crate::cli::DownloadArgs;
use crate::error::{Result, WaError};
use crate::output::{self, DownloadData, OutputFormat, ResultBuilder};
use crate::runtime::RuntimeContext;

pub async fn execute(rt: &RuntimeContext, args: DownloadArgs, format: OutputFormat, start: Instant) -> Result<()> {
	if args.message_id.trim().is_empty() || args.chat_jid.trim().is_empty() {
		return Err(WaError::InvalidInput("message id and chat JID are required".into()));
	}

	let response = rt.client.download_media(&args.message_id, &args.chat_jid).await?;

	let result = ResultBuilder::new("download")
		.started_at(start)
		.data(DownloadData {
			message_id: args.message_id,
			chat_jid: args.chat_jid,
			bridge_message: response.message,
			details: response.data,
		})
		.build();
	output::print_result(&result, format);
	Ok(())
}
