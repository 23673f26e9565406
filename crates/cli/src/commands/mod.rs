mod config;
mod connect;
mod disconnect;
mod download;
mod send;
mod status;
mod watch;

use std::time::Instant;

use crate::cli::{Cli, Commands};
use crate::config as config_store;
use crate::error::Result;
use crate::output::OutputFormat;
use crate::runtime::{RuntimeOverrides, Settings, build_runtime};

pub async fn dispatch(cli: Cli, format: OutputFormat) -> Result<()> {
	let start = Instant::now();
	let config_path = cli.config.clone().unwrap_or_else(config_store::default_path);

	// Config commands work on the file alone and never contact the bridge.
	if let Commands::Config(args) = cli.command {
		return config::execute(args.action, &config_path, cli.bridge_url, format, start);
	}

	let file = config_store::load(&config_path)?;
	let overrides = overrides_for(&cli);
	let settings = Settings::resolve(&file, &overrides);
	let rt = build_runtime(settings, config_path)?;

	let result = match cli.command {
		Commands::Status => status::execute(&rt, format, start).await,
		Commands::Connect(args) => connect::execute(&rt, &args, format, start).await,
		Commands::Disconnect => disconnect::execute(&rt, format, start).await,
		Commands::Watch(args) => watch::execute(&rt, &args, format).await,
		Commands::Send(args) => send::execute(&rt, args, format, start).await,
		Commands::Download(args) => download::execute(&rt, args, format, start).await,
		Commands::Config(_) => unreachable!("handled above"),
	};

	rt.monitor.shutdown();
	result
}

fn overrides_for(cli: &Cli) -> RuntimeOverrides {
	let mut overrides = RuntimeOverrides {
		bridge_url: cli.bridge_url.clone(),
		..Default::default()
	};
	match &cli.command {
		Commands::Connect(args) => {
			overrides.fast_poll_interval_ms = args.poll_interval_ms;
			overrides.fast_poll_timeout_ms = args.timeout_ms;
		}
		Commands::Watch(args) => overrides.poll_interval_ms = args.interval_ms,
		_ => {}
	}
	overrides
}
