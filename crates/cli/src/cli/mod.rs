#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Help colors in cargo's style: green headers, cyan literals.
fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

/// Root CLI for the bridge dashboard.
#[derive(Parser, Debug)]
#[command(name = "wa")]
#[command(about = "WhatsApp bridge dashboard - link status, QR pairing and messaging")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default), json, ndjson, or toon
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Bridge API base URL (overrides config file)
	#[arg(long, global = true, env = "WA_BRIDGE_URL", value_name = "URL")]
	pub bridge_url: Option<String>,

	/// Config file path (defaults to the user config dir)
	#[arg(long, global = true, env = "WA_CONFIG", value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Check the bridge's link status once.
	Status,
	/// Start linking a device and follow the QR pairing flow.
	Connect(ConnectArgs),
	/// Drop the bridge's WhatsApp link.
	Disconnect,
	/// Poll status in the background and print every change until Ctrl-C.
	Watch(WatchArgs),
	/// Send a text or media message.
	Send(SendArgs),
	/// Download the media attached to a stored message.
	Download(DownloadArgs),
	/// Inspect or change persisted configuration.
	Config(ConfigArgs),
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Status => "status",
			Commands::Connect(_) => "connect",
			Commands::Disconnect => "disconnect",
			Commands::Watch(_) => "watch",
			Commands::Send(_) => "send",
			Commands::Download(_) => "download",
			Commands::Config(_) => "config",
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
	/// Return as soon as the bridge accepts, without following the pairing.
	#[arg(long)]
	pub no_wait: bool,

	/// Fast-poll interval while waiting for the scan.
	#[arg(long, value_name = "MS")]
	pub poll_interval_ms: Option<u64>,

	/// Give up following the pairing after this long.
	#[arg(long, value_name = "MS")]
	pub timeout_ms: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
	/// Background poll interval.
	#[arg(long, value_name = "MS")]
	pub interval_ms: Option<u64>,

	/// Also print unchanged snapshots on every poll.
	#[arg(long)]
	pub all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
	/// Phone number with country code (digits only) or full JID.
	#[arg(value_name = "RECIPIENT")]
	pub recipient: String,

	/// Message text (caption when sending media).
	#[arg(value_name = "MESSAGE", default_value = "")]
	pub message: String,

	/// Path of a file on the bridge host to attach.
	#[arg(long, value_name = "PATH")]
	pub media: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
	#[arg(value_name = "MESSAGE_ID")]
	pub message_id: String,

	/// JID of the chat holding the message.
	#[arg(value_name = "CHAT_JID")]
	pub chat_jid: String,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
	#[command(subcommand)]
	pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
	/// Show the effective configuration.
	Show,
	/// Print the config file location.
	Path,
	/// Persist one setting.
	Set {
		#[arg(value_enum, value_name = "KEY")]
		key: ConfigKey,
		#[arg(value_name = "VALUE")]
		value: String,
	},
	/// Remove one persisted setting, restoring its default.
	Unset {
		#[arg(value_enum, value_name = "KEY")]
		key: ConfigKey,
	},
}

/// Settings that `wa config set` can change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigKey {
	BridgeUrl,
	PollIntervalMs,
	FastPollIntervalMs,
	FastPollTimeoutMs,
	RequestTimeoutMs,
}
