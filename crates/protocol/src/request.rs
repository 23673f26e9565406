//! Command bodies and the response envelope for bridge command endpoints.

use serde::{Deserialize, Serialize};

/// Envelope returned by `/api/connect`, `/api/disconnect`, `/api/send` and
/// `/api/download`.
///
/// The bridge reports refusals in-band with `success: false` rather than
/// through the HTTP status alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
	pub success: bool,
	#[serde(default)]
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

impl<T> ApiResponse<T> {
	pub fn accepted(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: message.into(),
			data: None,
		}
	}

	pub fn rejected(message: impl Into<String>) -> Self {
		Self {
			success: false,
			message: message.into(),
			data: None,
		}
	}
}

/// Body for `POST /api/send`.
///
/// `recipient` is either a phone number (digits only, with country code) or a
/// full JID such as `123456789@s.whatsapp.net` / `123456789@g.us`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
	pub recipient: String,
	#[serde(default)]
	pub message: String,
	/// Absolute path of a file on the bridge host to attach.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub media_path: Option<String>,
}

impl SendMessageRequest {
	pub fn text(recipient: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			recipient: recipient.into(),
			message: message.into(),
			media_path: None,
		}
	}

	/// Returns a description of the first problem with this request, if any.
	pub fn validate(&self) -> Result<(), String> {
		if self.recipient.trim().is_empty() {
			return Err("recipient is required".into());
		}
		let has_media = self.media_path.as_deref().is_some_and(|p| !p.trim().is_empty());
		if self.message.trim().is_empty() && !has_media {
			return Err("either a message or a media path is required".into());
		}
		Ok(())
	}
}

/// Body for `POST /api/download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadMediaRequest {
	pub message_id: String,
	pub chat_jid: String,
}
