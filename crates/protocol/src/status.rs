//! Connection status snapshot reported by the bridge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status message used before the bridge has reported anything.
pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to WhatsApp";

/// Snapshot of the bridge's link to WhatsApp, as returned by `GET /api/status`.
///
/// Invariants (enforced by [`normalized`](Self::normalized)):
/// - `authenticated` implies `connected`
/// - `qr_payload` is only present while connected and not yet authenticated
/// - `device_id` and `phone_number` are only present once authenticated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
	/// Transport-level link to WhatsApp is established.
	#[serde(default)]
	pub connected: bool,
	/// The linked device has completed pairing.
	#[serde(default)]
	pub authenticated: bool,
	/// Pairing QR payload, present only while awaiting a scan.
	#[serde(rename = "qr_code", default, skip_serializing_if = "Option::is_none")]
	pub qr_payload: Option<String>,
	/// Linked device identifier (JID), populated after authentication.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub device_id: Option<String>,
	/// Phone number of the linked account, populated after authentication.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	/// Human-readable status, always present.
	#[serde(default = "default_status_message")]
	pub status_message: String,
}

fn default_status_message() -> String {
	NOT_CONNECTED_MESSAGE.to_string()
}

impl Default for ConnectionState {
	fn default() -> Self {
		Self::not_connected()
	}
}

impl ConnectionState {
	/// The state a session starts in, and falls back to after teardown.
	pub fn not_connected() -> Self {
		Self {
			connected: false,
			authenticated: false,
			qr_payload: None,
			device_id: None,
			phone_number: None,
			status_message: default_status_message(),
		}
	}

	/// Returns the three-state view of this snapshot.
	pub fn phase(&self) -> LinkPhase {
		match (self.connected, self.authenticated) {
			(true, true) => LinkPhase::Authenticated,
			(true, false) => LinkPhase::Unauthenticated,
			(false, _) => LinkPhase::Disconnected,
		}
	}

	/// Returns true while a QR payload is waiting to be scanned.
	pub fn awaiting_scan(&self) -> bool {
		self.phase() == LinkPhase::Unauthenticated && self.qr_payload.is_some()
	}

	/// Drops fields that contradict the status invariants.
	///
	/// A snapshot claiming `authenticated` without `connected` is treated as
	/// not authenticated: no link means no usable pairing.
	pub fn normalized(mut self) -> Self {
		if self.authenticated && !self.connected {
			self.authenticated = false;
		}
		if self.phase() != LinkPhase::Unauthenticated {
			self.qr_payload = None;
		}
		if !self.authenticated {
			self.device_id = None;
			self.phone_number = None;
		}
		if self.qr_payload.as_deref().is_some_and(str::is_empty) {
			self.qr_payload = None;
		}
		self
	}
}

/// Coarse lifecycle phase derived from a [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPhase {
	/// No transport link to WhatsApp.
	Disconnected,
	/// Linked, waiting for the device to be paired by QR scan.
	Unauthenticated,
	/// Linked and paired.
	Authenticated,
}

impl fmt::Display for LinkPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LinkPhase::Disconnected => write!(f, "disconnected"),
			LinkPhase::Unauthenticated => write!(f, "connected (not authenticated)"),
			LinkPhase::Authenticated => write!(f, "connected & authenticated"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_bridge_status() {
		let json = r#"{
			"connected": true,
			"authenticated": false,
			"qr_code": "2@ABC123",
			"status_message": "Waiting for QR scan"
		}"#;
		let state: ConnectionState = serde_json::from_str(json).unwrap();

		assert!(state.connected);
		assert!(!state.authenticated);
		assert_eq!(state.qr_payload.as_deref(), Some("2@ABC123"));
		assert_eq!(state.phase(), LinkPhase::Unauthenticated);
		assert!(state.awaiting_scan());
	}

	#[test]
	fn missing_fields_fall_back_to_not_connected() {
		let state: ConnectionState = serde_json::from_str("{}").unwrap();
		assert_eq!(state, ConnectionState::not_connected());
	}

	#[test]
	fn serializes_qr_under_wire_name() {
		let state = ConnectionState {
			connected: true,
			qr_payload: Some("XYZ".into()),
			status_message: "scan".into(),
			..ConnectionState::not_connected()
		};
		let value = serde_json::to_value(&state).unwrap();

		assert_eq!(value["qr_code"], "XYZ");
		assert!(value.get("qr_payload").is_none());
		assert!(value.get("device_id").is_none());
	}

	#[test]
	fn normalized_rejects_authenticated_without_link() {
		let state = ConnectionState {
			connected: false,
			authenticated: true,
			device_id: Some("dev-1".into()),
			..ConnectionState::not_connected()
		}
		.normalized();

		assert!(!state.authenticated);
		assert_eq!(state.device_id, None);
		assert_eq!(state.phase(), LinkPhase::Disconnected);
	}

	#[test]
	fn normalized_clears_qr_once_authenticated() {
		let state = ConnectionState {
			connected: true,
			authenticated: true,
			qr_payload: Some("stale".into()),
			device_id: Some("dev-1".into()),
			phone_number: Some("+15550100".into()),
			status_message: "ok".into(),
		}
		.normalized();

		assert_eq!(state.qr_payload, None);
		assert_eq!(state.device_id.as_deref(), Some("dev-1"));
		assert_eq!(state.phone_number.as_deref(), Some("+15550100"));
	}

	#[test]
	fn normalized_drops_empty_qr() {
		let state = ConnectionState {
			connected: true,
			qr_payload: Some(String::new()),
			..ConnectionState::not_connected()
		}
		.normalized();

		assert!(!state.awaiting_scan());
	}
}
