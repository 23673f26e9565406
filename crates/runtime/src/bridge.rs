//! Bridge control collaborator: the trait the monitor consumes and its HTTP
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use tracing::debug;
use wa_protocol::{ApiResponse, ConnectionState, DownloadMediaRequest, SendMessageRequest};

use crate::error::{Error, Operation, Result};

/// Base URL of a bridge running with its default settings.
pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:8080/api";

/// Per-request timeout applied by [`BridgeClient::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body excerpt carried into an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// The three bridge operations the connection monitor drives.
#[async_trait]
pub trait BridgeControl: Send + Sync {
	/// Fetches the bridge's current link status.
	async fn connection_status(&self) -> Result<ConnectionState>;

	/// Asks the bridge to start linking a device (QR pairing).
	async fn initiate_connection(&self) -> Result<ApiResponse>;

	/// Asks the bridge to drop its WhatsApp link.
	async fn disconnect(&self) -> Result<ApiResponse>;
}

/// HTTP client for the bridge's `/api` endpoints.
#[derive(Debug, Clone)]
pub struct BridgeClient {
	http: reqwest::Client,
	base: Url,
}

impl BridgeClient {
	/// Creates a client rooted at `base_url` with [`DEFAULT_REQUEST_TIMEOUT`].
	pub fn new(base_url: &str) -> Result<Self> {
		Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
	}

	pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
		let base = parse_base_url(base_url)?;
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| Error::InvalidUrl {
				url: base_url.to_string(),
				reason: format!("failed to create HTTP client: {e}"),
			})?;
		Ok(Self { http, base })
	}

	pub fn base_url(&self) -> &Url {
		&self.base
	}

	/// Sends a text or media message through the bridge.
	///
	/// A `success: false` reply is returned as [`Error::Rejected`].
	pub async fn send_message(&self, request: &SendMessageRequest) -> Result<ApiResponse> {
		if let Err(reason) = request.validate() {
			return Err(Error::Rejected {
				operation: Operation::SendMessage,
				message: reason,
			});
		}
		let response = self.post_command(Operation::SendMessage, "send", Some(request)).await?;
		accepted_or_rejected(Operation::SendMessage, response)
	}

	/// Asks the bridge to download the media attached to a stored message.
	pub async fn download_media(&self, message_id: &str, chat_jid: &str) -> Result<ApiResponse> {
		let body = DownloadMediaRequest {
			message_id: message_id.to_string(),
			chat_jid: chat_jid.to_string(),
		};
		let response = self.post_command(Operation::DownloadMedia, "download", Some(&body)).await?;
		accepted_or_rejected(Operation::DownloadMedia, response)
	}

	fn endpoint(&self, path: &str) -> Url {
		// Base always ends with '/', so join appends rather than replaces.
		self.base.join(path).unwrap_or_else(|_| self.base.clone())
	}

	async fn post_command<B: Serialize + ?Sized>(&self, operation: Operation, path: &str, body: Option<&B>) -> Result<ApiResponse> {
		let url = self.endpoint(path);
		debug!(target: "wa.bridge", %url, %operation, "POST");

		let mut request = self.http.post(url);
		request = match body {
			Some(body) => request.json(body),
			None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
		};
		let response = request.send().await.map_err(|e| Error::transport(operation, e))?;

		let status = response.status();
		let text = response.text().await.map_err(|e| Error::transport(operation, e))?;

		// The bridge reports refusals as `success: false` bodies, sometimes with
		// a non-2xx status; prefer the in-band answer when there is one.
		match serde_json::from_str::<ApiResponse>(&text) {
			Ok(parsed) => {
				debug!(target: "wa.bridge", %operation, %status, success = parsed.success, "command answered");
				Ok(parsed)
			}
			Err(_) if !status.is_success() => Err(http_status_error(operation, status, &text)),
			Err(e) => Err(Error::transport(operation, format!("invalid response body: {e}"))),
		}
	}
}

#[async_trait]
impl BridgeControl for BridgeClient {
	async fn connection_status(&self) -> Result<ConnectionState> {
		let url = self.endpoint("status");
		let response = self
			.http
			.get(url)
			.header(reqwest::header::CONTENT_TYPE, "application/json")
			.send()
			.await
			.map_err(|e| Error::transport(Operation::Status, e))?;

		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			return Err(http_status_error(Operation::Status, status, &text));
		}

		response
			.json::<ConnectionState>()
			.await
			.map_err(|e| Error::transport(Operation::Status, format!("invalid status body: {e}")))
	}

	async fn initiate_connection(&self) -> Result<ApiResponse> {
		self.post_command::<()>(Operation::Connect, "connect", None).await
	}

	async fn disconnect(&self) -> Result<ApiResponse> {
		self.post_command::<()>(Operation::Disconnect, "disconnect", None).await
	}
}

fn parse_base_url(raw: &str) -> Result<Url> {
	let invalid = |reason: String| Error::InvalidUrl {
		url: raw.to_string(),
		reason,
	};

	let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
	}
	if url.cannot_be_a_base() {
		return Err(invalid("not a base URL".into()));
	}
	url.set_query(None);
	url.set_fragment(None);
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}
	Ok(url)
}

fn accepted_or_rejected(operation: Operation, response: ApiResponse) -> Result<ApiResponse> {
	if response.success {
		Ok(response)
	} else {
		Err(Error::Rejected {
			operation,
			message: response.message,
		})
	}
}

fn http_status_error(operation: Operation, status: StatusCode, body: &str) -> Error {
	let excerpt: String = body.trim().chars().take(BODY_EXCERPT_LEN).collect();
	if excerpt.is_empty() {
		Error::transport(operation, format!("HTTP {status}"))
	} else {
		Error::transport(operation, format!("HTTP {status}: {excerpt}"))
	}
}
