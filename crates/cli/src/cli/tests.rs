use clap::Parser;

use super::*;

#[test]
fn parse_status_command() {
	let cli = Cli::try_parse_from(["wa", "status"]).unwrap();
	assert!(matches!(cli.command, Commands::Status));
	assert_eq!(cli.format, OutputFormat::Text);
	assert_eq!(cli.verbose, 0);
}

#[test]
fn parse_connect_defaults() {
	let cli = Cli::try_parse_from(["wa", "connect"]).unwrap();

	match cli.command {
		Commands::Connect(args) => {
			assert!(!args.no_wait);
			assert_eq!(args.poll_interval_ms, None);
			assert_eq!(args.timeout_ms, None);
		}
		_ => panic!("Expected Connect command"),
	}
}

#[test]
fn parse_connect_with_overrides() {
	let cli = Cli::try_parse_from(["wa", "connect", "--no-wait", "--poll-interval-ms", "500", "--timeout-ms", "60000"]).unwrap();

	match cli.command {
		Commands::Connect(args) => {
			assert!(args.no_wait);
			assert_eq!(args.poll_interval_ms, Some(500));
			assert_eq!(args.timeout_ms, Some(60_000));
		}
		_ => panic!("Expected Connect command"),
	}
}

#[test]
fn parse_send_with_media() {
	let cli = Cli::try_parse_from(["wa", "send", "15550100", "look at this", "--media", "/tmp/cat.jpg"]).unwrap();

	match cli.command {
		Commands::Send(args) => {
			assert_eq!(args.recipient, "15550100");
			assert_eq!(args.message, "look at this");
			assert_eq!(args.media.as_deref(), Some("/tmp/cat.jpg"));
		}
		_ => panic!("Expected Send command"),
	}
}

#[test]
fn parse_send_media_without_caption() {
	let cli = Cli::try_parse_from(["wa", "send", "15550100", "--media", "/tmp/cat.jpg"]).unwrap();

	match cli.command {
		Commands::Send(args) => assert!(args.message.is_empty()),
		_ => panic!("Expected Send command"),
	}
}

#[test]
fn parse_download_requires_chat() {
	assert!(Cli::try_parse_from(["wa", "download", "msg1"]).is_err());

	let cli = Cli::try_parse_from(["wa", "download", "msg1", "15550100@s.whatsapp.net"]).unwrap();
	match cli.command {
		Commands::Download(args) => {
			assert_eq!(args.message_id, "msg1");
			assert_eq!(args.chat_jid, "15550100@s.whatsapp.net");
		}
		_ => panic!("Expected Download command"),
	}
}

#[test]
fn parse_config_set() {
	let cli = Cli::try_parse_from(["wa", "config", "set", "bridge-url", "http://10.0.0.2:8080/api"]).unwrap();

	match cli.command {
		Commands::Config(ConfigArgs {
			action: ConfigAction::Set { key, value },
		}) => {
			assert_eq!(key, ConfigKey::BridgeUrl);
			assert_eq!(value, "http://10.0.0.2:8080/api");
		}
		_ => panic!("Expected Config Set command"),
	}
}

#[test]
fn parse_config_rejects_unknown_key() {
	assert!(Cli::try_parse_from(["wa", "config", "set", "colour", "blue"]).is_err());
}

#[test]
fn global_flags_after_subcommand() {
	let cli = Cli::try_parse_from(["wa", "watch", "-vv", "-f", "ndjson", "--bridge-url", "http://bridge:8080/api"]).unwrap();

	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Ndjson);
	assert_eq!(cli.bridge_url.as_deref(), Some("http://bridge:8080/api"));
	assert!(matches!(cli.command, Commands::Watch(_)));
}

#[test]
fn command_names() {
	let cli = Cli::try_parse_from(["wa", "disconnect"]).unwrap();
	assert_eq!(cli.command.name(), "disconnect");
}
