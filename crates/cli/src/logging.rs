use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init_logging(verbosity: u8) {
	// 0 = errors only (bridge failures already surface in the output envelope)
	// 1 (-v) = phase changes and accepted commands
	// 2 (-vv) = every HTTP call and timer event
	// 3+ = everything, including reqwest/hyper internals
	let filter = match verbosity {
		0 => "error",
		1 => "warn,wa=info",
		2 => "info,wa=debug",
		_ => "trace",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
