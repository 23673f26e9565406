//! Result envelope printed by every command.
//!
//! Machine formats wrap command data in a [`CommandResult`]:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": true,
//!   "command": "status",
//!   "data": { "phase": "authenticated", "state": { ... } },
//!   "timings": { "durationMs": 12 }
//! }
//! ```
//!
//! A failed command carries `"ok": false` and an `error` object with a stable
//! [`ErrorCode`] instead of `data`. Failures the monitor absorbed without
//! failing the command appear under `diagnostics`.
//!
//! `text` prints the data's [`TextRender`] form and no envelope.

#[cfg(test)]
mod tests;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use wa_protocol::{ConnectionState, LinkPhase};
use wa_runtime::{ConnectOutcome, DisconnectOutcome, FastPollEnd, MonitorError};

use crate::render;

/// Bumped on breaking changes to the envelope.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// Pretty-printed JSON envelope
	Json,
	/// One compact JSON envelope per line
	Ndjson,
	/// TOON envelope (token-efficient for LLMs)
	Toon,
}

impl OutputFormat {
	/// True for the formats that print an envelope.
	pub fn is_machine(self) -> bool {
		self != OutputFormat::Text
	}
}

/// Human-readable rendering used by [`OutputFormat::Text`].
pub trait TextRender {
	fn render_text(&self) -> String;
}

impl TextRender for () {
	fn render_text(&self) -> String {
		String::new()
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	pub timings: Timings,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable failure classes for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Bridge could not be reached or answered garbage
	BridgeUnreachable,
	/// Bridge answered `success: false`
	RequestRejected,
	/// Pairing did not complete in time
	Timeout,
	InvalidInput,
	/// Config file could not be read or written
	ConfigError,
	IoError,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::BridgeUnreachable => "BRIDGE_UNREACHABLE",
			ErrorCode::RequestRejected => "REQUEST_REJECTED",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

/// A bridge failure the command survived.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub source: &'static str,
	pub message: String,
}

pub struct ResultBuilder<T: Serialize> {
	command: String,
	start: Instant,
	data: Option<T>,
	error: Option<CommandError>,
	diagnostics: Vec<Diagnostic>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			start: Instant::now(),
			data: None,
			error: None,
			diagnostics: Vec::new(),
		}
	}

	/// Measure the duration from `start` instead of from `new`.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start = start;
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	/// Records a failure the monitor absorbed, if any.
	pub fn monitor_error(mut self, error: Option<&MonitorError>) -> Self {
		if let Some(err) = error {
			self.diagnostics.push(Diagnostic {
				source: "bridge",
				message: err.to_string(),
			});
		}
		self
	}

	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			schema_version: SCHEMA_VERSION,
			ok: self.error.is_none() && self.data.is_some(),
			command: self.command,
			data: self.data,
			error: self.error,
			timings: Timings {
				duration_ms: wa_runtime::config::as_millis(self.start.elapsed()),
			},
			diagnostics: self.diagnostics,
		}
	}
}

/// Writes `result` to stdout in `format`.
pub fn print_result<T: Serialize + TextRender>(result: &CommandResult<T>, format: OutputFormat) {
	let rendered = match format {
		OutputFormat::Text => Ok(render_text(result)),
		OutputFormat::Json => serde_json::to_string_pretty(result),
		OutputFormat::Ndjson => serde_json::to_string(result),
		OutputFormat::Toon => serde_json::to_value(result).map(|value| toon::encode(&value, None)),
	};
	match rendered {
		Ok(text) if text.is_empty() => {}
		Ok(text) => {
			let _ = writeln!(io::stdout().lock(), "{text}");
		}
		Err(err) => tracing::error!(target: "wa_cli", %err, "failed to encode result"),
	}
}

fn render_text<T: Serialize + TextRender>(result: &CommandResult<T>) -> String {
	let mut lines = Vec::new();
	match (&result.data, &result.error) {
		(_, Some(error)) => lines.push(format!("Error [{}]: {}", error.code, error.message)),
		(Some(data), None) => {
			let text = data.render_text();
			if !text.is_empty() {
				lines.push(text.trim_end().to_string());
			}
		}
		(None, None) => {}
	}
	for diag in &result.diagnostics {
		lines.push(format!("[warning:{}] {}", diag.source, diag.message));
	}
	lines.join("\n")
}

/// Human-readable error line on stderr.
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

/// Result data for `status`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
	pub phase: LinkPhase,
	pub state: ConnectionState,
}

impl StatusData {
	pub fn new(state: ConnectionState) -> Self {
		Self { phase: state.phase(), state }
	}
}

impl TextRender for StatusData {
	fn render_text(&self) -> String {
		render::state_panel(&self.state)
	}
}

/// Result data for `connect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectData {
	pub outcome: ConnectOutcome,
	/// How the fast-poll sub-phase ended; absent with `--no-wait`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fast_poll: Option<FastPollEnd>,
	/// Distinct QR payloads shown while waiting for the scan.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub qr_payloads: Vec<String>,
	pub phase: LinkPhase,
	pub state: ConnectionState,
}

impl TextRender for ConnectData {
	fn render_text(&self) -> String {
		let headline = match (&self.outcome, self.fast_poll) {
			(_, Some(FastPollEnd::Authenticated)) => "Device linked.".to_string(),
			(ConnectOutcome::Accepted { message }, None) => format!("Connection initiated: {message}"),
			(ConnectOutcome::AlreadyInProgress, _) => "A connection attempt is already in progress.".to_string(),
			(_, Some(FastPollEnd::TimedOut)) => "Stopped waiting for the QR scan.".to_string(),
			(_, Some(FastPollEnd::Cancelled)) => "Connection attempt cancelled.".to_string(),
			(ConnectOutcome::Rejected { message }, _) | (ConnectOutcome::Unreachable { message }, _) => message.clone(),
		};
		format!("{headline}\n\n{}", render::state_panel(&self.state))
	}
}

/// Result data for `disconnect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectData {
	pub outcome: DisconnectOutcome,
	pub phase: LinkPhase,
	pub state: ConnectionState,
}

impl TextRender for DisconnectData {
	fn render_text(&self) -> String {
		let headline = match &self.outcome {
			DisconnectOutcome::Accepted { message } => format!("Disconnect accepted: {message}"),
			DisconnectOutcome::Rejected { message } => format!("Disconnect refused: {message}"),
			DisconnectOutcome::Unreachable { message } => format!("Disconnect failed: {message}"),
		};
		format!("{headline}\n\n{}", render::state_panel(&self.state))
	}
}

/// One record emitted by `watch` per change of state or bridge failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangeData {
	/// Monotonic record counter, starting at 1.
	pub seq: u64,
	pub phase: LinkPhase,
	pub state: ConnectionState,
	/// Latest failure still standing; `state` is the last good snapshot.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_error: Option<MonitorError>,
}

impl TextRender for StateChangeData {
	fn render_text(&self) -> String {
		render::state_line(self.seq, &self.state, self.last_error.as_ref())
	}
}

/// Result data for `send`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendData {
	pub recipient: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub media_path: Option<String>,
	/// Bridge's confirmation text.
	pub bridge_message: String,
}

impl TextRender for SendData {
	fn render_text(&self) -> String {
		self.bridge_message.clone()
	}
}

/// Result data for `download`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadData {
	pub message_id: String,
	pub chat_jid: String,
	pub bridge_message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

impl TextRender for DownloadData {
	fn render_text(&self) -> String {
		match self.details {
			Some(ref details) => format!("{}\n{}", self.bridge_message, serde_json::to_string_pretty(details).unwrap_or_default()),
			None => self.bridge_message.clone(),
		}
	}
}

/// Result data for `config show|path|set|unset`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigData {
	pub path: PathBuf,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub effective: Option<serde_json::Value>,
}

impl TextRender for ConfigData {
	fn render_text(&self) -> String {
		match self.effective {
			Some(ref effective) => format!(
				"# {}\n{}",
				self.path.display(),
				serde_json::to_string_pretty(effective).unwrap_or_default()
			),
			None => self.path.display().to_string(),
		}
	}
}
