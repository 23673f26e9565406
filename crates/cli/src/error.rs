use std::path::PathBuf;

use thiserror::Error;
use wa_protocol::ConnectionState;
use wa_runtime::Operation;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, WaError>;

#[derive(Debug, Error)]
pub enum WaError {
	#[error("bridge unreachable during {operation}: {message}")]
	Unreachable { operation: Operation, message: String },

	#[error("{operation} rejected: {message}")]
	Rejected { operation: Operation, message: String },

	#[error("device not linked after {ms}ms")]
	PairingTimeout { ms: u64, state: Box<ConnectionState> },

	#[error("connection attempt cancelled")]
	PairingCancelled { state: Box<ConnectionState> },

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("config error at {path}: {message}")]
	Config { path: PathBuf, message: String },

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl From<wa_runtime::Error> for WaError {
	fn from(err: wa_runtime::Error) -> Self {
		match err {
			wa_runtime::Error::InvalidUrl { url, reason } => WaError::InvalidInput(format!("bridge URL {url:?}: {reason}")),
			wa_runtime::Error::Transport { operation, message } => WaError::Unreachable { operation, message },
			wa_runtime::Error::Rejected { operation, message } => WaError::Rejected { operation, message },
		}
	}
}

impl WaError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			WaError::Unreachable { operation, .. } => (ErrorCode::BridgeUnreachable, Some(serde_json::json!({ "operation": operation }))),
			WaError::Rejected { operation, .. } => (ErrorCode::RequestRejected, Some(serde_json::json!({ "operation": operation }))),
			WaError::PairingTimeout { ms, state } => (
				ErrorCode::Timeout,
				Some(serde_json::json!({ "timeoutMs": ms, "phase": state.phase(), "state": state })),
			),
			WaError::PairingCancelled { state } => (
				ErrorCode::InternalError,
				Some(serde_json::json!({ "phase": state.phase(), "state": state })),
			),
			WaError::InvalidInput(_) => (ErrorCode::InvalidInput, None),
			WaError::Config { path, .. } => (ErrorCode::ConfigError, Some(serde_json::json!({ "path": path }))),
			WaError::Io(_) => (ErrorCode::IoError, None),
			WaError::Json(_) | WaError::Anyhow(_) => (ErrorCode::InternalError, None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}
