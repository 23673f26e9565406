//! Error types for bridge calls and the connection monitor.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge endpoint an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	Status,
	Connect,
	Disconnect,
	SendMessage,
	DownloadMedia,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Operation::Status => "status check",
			Operation::Connect => "connect",
			Operation::Disconnect => "disconnect",
			Operation::SendMessage => "send message",
			Operation::DownloadMedia => "download media",
		};
		f.write_str(name)
	}
}

/// Errors produced while talking to the bridge.
#[derive(Debug, Error)]
pub enum Error {
	/// The configured bridge base URL cannot be used.
	#[error("invalid bridge URL '{url}': {reason}")]
	InvalidUrl { url: String, reason: String },

	/// The bridge could not be reached, or answered with something unusable.
	#[error("bridge unreachable during {operation}: {message}")]
	Transport { operation: Operation, message: String },

	/// The bridge answered with `success: false`.
	#[error("bridge rejected {operation}: {message}")]
	Rejected { operation: Operation, message: String },
}

impl Error {
	pub(crate) fn transport(operation: Operation, err: impl fmt::Display) -> Self {
		Error::Transport {
			operation,
			message: err.to_string(),
		}
	}

	/// Returns the classification the monitor records this error under.
	pub fn kind(&self) -> FailureKind {
		match self {
			Error::Rejected { .. } => FailureKind::Rejected,
			Error::InvalidUrl { .. } | Error::Transport { .. } => FailureKind::Transport,
		}
	}

	pub fn operation(&self) -> Option<Operation> {
		match self {
			Error::Transport { operation, .. } | Error::Rejected { operation, .. } => Some(*operation),
			Error::InvalidUrl { .. } => None,
		}
	}
}

/// Non-fatal failure classes recorded by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	/// Bridge unreachable or response unusable.
	Transport,
	/// Bridge answered `success: false`.
	Rejected,
}

/// A failure the monitor recorded instead of propagating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorError {
	pub kind: FailureKind,
	pub operation: Operation,
	pub message: String,
}

impl MonitorError {
	pub fn rejected(operation: Operation, message: impl Into<String>) -> Self {
		Self {
			kind: FailureKind::Rejected,
			operation,
			message: message.into(),
		}
	}

	pub(crate) fn from_error(operation: Operation, err: &Error) -> Self {
		let message = match err {
			Error::Transport { message, .. } | Error::Rejected { message, .. } => message.clone(),
			Error::InvalidUrl { .. } => err.to_string(),
		};
		Self {
			kind: err.kind(),
			operation: err.operation().unwrap_or(operation),
			message,
		}
	}
}

impl fmt::Display for MonitorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			FailureKind::Transport => write!(f, "{} failed: {}", self.operation, self.message),
			FailureKind::Rejected => write!(f, "{} rejected: {}", self.operation, self.message),
		}
	}
}
