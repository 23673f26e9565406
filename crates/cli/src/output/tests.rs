use wa_runtime::Operation;

use super::*;

fn linked() -> ConnectionState {
	ConnectionState {
		connected: true,
		authenticated: true,
		device_id: Some("dev-1".into()),
		phone_number: Some("+15550100".into()),
		status_message: "Connected".into(),
		..ConnectionState::not_connected()
	}
}

#[test]
fn result_builder_success() {
	let result: CommandResult<StatusData> = ResultBuilder::new("status").data(StatusData::new(linked())).build();

	assert!(result.ok);
	assert_eq!(result.command, "status");
	assert_eq!(result.schema_version, SCHEMA_VERSION);
	assert!(result.data.is_some());
	assert!(result.error.is_none());
}

#[test]
fn result_builder_error() {
	let result: CommandResult<StatusData> = ResultBuilder::new("status")
		.command_error(CommandError {
			code: ErrorCode::BridgeUnreachable,
			message: "connection refused".into(),
			details: None,
		})
		.build();

	assert!(!result.ok);
	assert!(result.data.is_none());
	let json = serde_json::to_value(&result).unwrap();
	assert_eq!(json["error"]["code"], "BRIDGE_UNREACHABLE");
	assert!(json["error"].get("details").is_none());
	assert!(json.get("data").is_none());
}

#[test]
fn error_code_display_matches_serde() {
	for code in [ErrorCode::BridgeUnreachable, ErrorCode::RequestRejected, ErrorCode::Timeout, ErrorCode::ConfigError] {
		let json = serde_json::to_value(code).unwrap();
		assert_eq!(json, code.to_string());
	}
}

#[test]
fn only_text_skips_the_envelope() {
	assert!(!OutputFormat::Text.is_machine());
	assert!(OutputFormat::Json.is_machine());
	assert!(OutputFormat::Ndjson.is_machine());
	assert!(OutputFormat::Toon.is_machine());
}

#[test]
fn status_envelope_shape() {
	let result = ResultBuilder::new("status").data(StatusData::new(linked())).build();
	let json = serde_json::to_value(&result).unwrap();

	assert_eq!(json["ok"], true);
	assert_eq!(json["schemaVersion"], 1);
	assert_eq!(json["data"]["phase"], "authenticated");
	assert_eq!(json["data"]["state"]["device_id"], "dev-1");
	assert!(json["data"]["state"].get("qr_code").is_none());
	assert!(json.get("diagnostics").is_none());
}

#[test]
fn monitor_error_becomes_bridge_diagnostic() {
	let failure = MonitorError::rejected(Operation::Connect, "Already connected");
	let result = ResultBuilder::new("status")
		.data(StatusData::new(linked()))
		.monitor_error(Some(&failure))
		.monitor_error(None)
		.build();

	assert!(result.ok);
	assert_eq!(result.diagnostics.len(), 1);
	assert_eq!(result.diagnostics[0].source, "bridge");
	assert_eq!(result.diagnostics[0].message, "connect rejected: Already connected");
	assert_eq!(render_text(&result).lines().last(), Some("[warning:bridge] connect rejected: Already connected"));
}

#[test]
fn watch_record_carries_standing_failure() {
	let failure = MonitorError {
		kind: wa_runtime::FailureKind::Transport,
		operation: Operation::Status,
		message: "connection refused".into(),
	};
	let record = StateChangeData {
		seq: 2,
		phase: LinkPhase::Disconnected,
		state: ConnectionState::not_connected(),
		last_error: Some(failure),
	};
	let json = serde_json::to_value(&record).unwrap();
	assert_eq!(json["lastError"]["kind"], "transport");
	assert_eq!(json["lastError"]["operation"], "status");
	assert_eq!(json["lastError"]["message"], "connection refused");

	let cleared = StateChangeData { last_error: None, ..record };
	assert!(serde_json::to_value(&cleared).unwrap().get("lastError").is_none());
}

#[test]
fn connect_data_serializes_outcome_and_fast_poll() {
	let data = ConnectData {
		outcome: ConnectOutcome::Accepted { message: "scan QR".into() },
		fast_poll: Some(FastPollEnd::Authenticated),
		qr_payloads: vec!["2@A".into(), "2@B".into()],
		phase: LinkPhase::Authenticated,
		state: linked(),
	};
	let json = serde_json::to_value(&data).unwrap();

	assert_eq!(json["fastPoll"], serde_json::to_value(FastPollEnd::Authenticated).unwrap());
	assert_eq!(json["qrPayloads"].as_array().unwrap().len(), 2);
	assert_eq!(json["outcome"], serde_json::to_value(&data.outcome).unwrap());
}

#[test]
fn connect_text_headline() {
	colored::control::set_override(false);
	let data = ConnectData {
		outcome: ConnectOutcome::Accepted { message: "scan QR".into() },
		fast_poll: Some(FastPollEnd::Authenticated),
		qr_payloads: Vec::new(),
		phase: LinkPhase::Authenticated,
		state: linked(),
	};
	assert!(data.render_text().starts_with("Device linked."));

	let no_wait = ConnectData {
		fast_poll: None,
		..data
	};
	assert!(no_wait.render_text().starts_with("Connection initiated: scan QR"));
}

#[test]
fn send_data_omits_empty_caption() {
	let data = SendData {
		recipient: "15550100".into(),
		message: String::new(),
		media_path: Some("/tmp/cat.jpg".into()),
		bridge_message: "Media sent".into(),
	};
	let json = serde_json::to_value(&data).unwrap();
	assert!(json.get("message").is_none());
	assert_eq!(json["mediaPath"], "/tmp/cat.jpg");
	assert_eq!(data.render_text(), "Media sent");
}
