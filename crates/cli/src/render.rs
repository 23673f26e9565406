//! Human-readable rendering of connection state for `--format text`.

use colored::{ColoredString, Colorize};
use wa_protocol::{ConnectionState, LinkPhase};
use wa_runtime::MonitorError;

/// Colored phase label: red when disconnected, yellow while awaiting a scan,
/// green once linked.
pub fn phase_badge(phase: LinkPhase) -> ColoredString {
	match phase {
		LinkPhase::Disconnected => "● disconnected".red().bold(),
		LinkPhase::Unauthenticated => "● awaiting scan".yellow().bold(),
		LinkPhase::Authenticated => "● linked".green().bold(),
	}
}

/// Multi-line panel: phase, status message, then the QR payload or device
/// details depending on phase.
pub fn state_panel(state: &ConnectionState) -> String {
	let mut lines = vec![
		format!("{} {}", "Status:".bold(), phase_badge(state.phase())),
		format!("{} {}", "Message:".bold(), state.status_message),
	];

	match state.phase() {
		LinkPhase::Unauthenticated => match state.qr_payload {
			Some(ref qr) => {
				lines.push(format!("{}", "Scan this QR payload with WhatsApp on your phone:".bold()));
				lines.push(format!("  {}", qr.cyan()));
			}
			None => lines.push(format!("{}", "Waiting for the bridge to produce a QR code...".dimmed())),
		},
		LinkPhase::Authenticated => {
			if let Some(ref device) = state.device_id {
				lines.push(format!("{} {device}", "Device:".bold()));
			}
			if let Some(ref phone) = state.phone_number {
				lines.push(format!("{} {phone}", "Phone:".bold()));
			}
		}
		LinkPhase::Disconnected => {}
	}

	lines.join("\n")
}

/// One-line summary used by `watch`, with the latest bridge failure if any.
pub fn state_line(seq: u64, state: &ConnectionState, error: Option<&MonitorError>) -> String {
	let mut line = format!("{} {} {}", format!("#{seq}").dimmed(), phase_badge(state.phase()), state.status_message);
	match state.phase() {
		LinkPhase::Unauthenticated if state.awaiting_scan() => {
			line.push_str(&format!(" qr={}", state.qr_payload.as_deref().unwrap_or_default().cyan()));
		}
		LinkPhase::Unauthenticated => {}
		LinkPhase::Authenticated => {
			if let Some(ref phone) = state.phone_number {
				line.push_str(&format!(" phone={phone}"));
			}
		}
		LinkPhase::Disconnected => {}
	}
	if let Some(err) = error {
		line.push_str(&format!(" {}", format!("({err})").red()));
	}
	line
}
