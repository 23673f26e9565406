//! Runtime setup: effective settings and the bridge/monitor pair built from them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use wa_runtime::config::{DEFAULT_FAST_POLL_INTERVAL, DEFAULT_FAST_POLL_TIMEOUT, DEFAULT_POLL_INTERVAL, as_millis};
use wa_runtime::{BridgeClient, ConnectionMonitor, DEFAULT_BRIDGE_URL, DEFAULT_REQUEST_TIMEOUT, MonitorConfig};

use crate::config::CliConfig;
use crate::error::Result;

/// Request-scoped overrides taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
	/// `--bridge-url` or `WA_BRIDGE_URL`.
	pub bridge_url: Option<String>,
	pub poll_interval_ms: Option<u64>,
	pub fast_poll_interval_ms: Option<u64>,
	pub fast_poll_timeout_ms: Option<u64>,
}

/// Settings after applying flags over the config file over defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	pub bridge_url: String,
	pub poll_interval_ms: u64,
	pub fast_poll_interval_ms: u64,
	pub fast_poll_timeout_ms: u64,
	pub request_timeout_ms: u64,
}

impl Settings {
	pub fn resolve(config: &CliConfig, overrides: &RuntimeOverrides) -> Self {
		Self {
			bridge_url: overrides
				.bridge_url
				.clone()
				.or_else(|| config.bridge_url.clone())
				.unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string()),
			poll_interval_ms: overrides
				.poll_interval_ms
				.or(config.poll_interval_ms)
				.unwrap_or(as_millis(DEFAULT_POLL_INTERVAL)),
			fast_poll_interval_ms: overrides
				.fast_poll_interval_ms
				.or(config.fast_poll_interval_ms)
				.unwrap_or(as_millis(DEFAULT_FAST_POLL_INTERVAL)),
			fast_poll_timeout_ms: overrides
				.fast_poll_timeout_ms
				.or(config.fast_poll_timeout_ms)
				.unwrap_or(as_millis(DEFAULT_FAST_POLL_TIMEOUT)),
			request_timeout_ms: config.request_timeout_ms.unwrap_or(as_millis(DEFAULT_REQUEST_TIMEOUT)),
		}
	}

	pub fn monitor_config(&self) -> MonitorConfig {
		MonitorConfig::from_millis(Some(self.poll_interval_ms), Some(self.fast_poll_interval_ms), Some(self.fast_poll_timeout_ms))
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}
}

/// Runtime context bundle used for command execution.
pub struct RuntimeContext {
	pub settings: Settings,
	pub config_path: PathBuf,
	pub client: Arc<BridgeClient>,
	pub monitor: ConnectionMonitor,
}

/// Builds the bridge client and its monitor from resolved settings.
///
/// The monitor shares the client, so `send`/`download` and the status
/// operations use one connection pool.
pub fn build_runtime(settings: Settings, config_path: PathBuf) -> Result<RuntimeContext> {
	let client = Arc::new(BridgeClient::with_timeout(&settings.bridge_url, settings.request_timeout())?);
	let monitor = ConnectionMonitor::new(client.clone(), settings.monitor_config());
	tracing::debug!(target: "wa_cli", bridge = %client.base_url(), "runtime ready");

	Ok(RuntimeContext {
		settings,
		config_path,
		client,
		monitor,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_apply_without_config_or_flags() {
		let settings = Settings::resolve(&CliConfig::new(), &RuntimeOverrides::default());
		assert_eq!(settings.bridge_url, DEFAULT_BRIDGE_URL);
		assert_eq!(settings.poll_interval_ms, 5_000);
		assert_eq!(settings.fast_poll_interval_ms, 2_000);
		assert_eq!(settings.fast_poll_timeout_ms, 180_000);
		assert_eq!(settings.request_timeout_ms, 10_000);
	}

	#[test]
	fn flags_win_over_config_file() {
		let config = CliConfig {
			bridge_url: Some("http://from-file:8080/api".into()),
			poll_interval_ms: Some(7_000),
			fast_poll_timeout_ms: Some(60_000),
			..CliConfig::new()
		};
		let overrides = RuntimeOverrides {
			bridge_url: Some("http://from-flag:8080/api".into()),
			fast_poll_timeout_ms: Some(30_000),
			..Default::default()
		};

		let settings = Settings::resolve(&config, &overrides);
		assert_eq!(settings.bridge_url, "http://from-flag:8080/api");
		assert_eq!(settings.poll_interval_ms, 7_000);
		assert_eq!(settings.fast_poll_timeout_ms, 30_000);
	}

	#[test]
	fn monitor_config_clamps_tiny_intervals() {
		let overrides = RuntimeOverrides {
			fast_poll_interval_ms: Some(1),
			..Default::default()
		};
		let settings = Settings::resolve(&CliConfig::new(), &overrides);
		assert_eq!(settings.monitor_config().fast_poll_interval, wa_runtime::config::MIN_POLL_INTERVAL);
	}

	#[test]
	fn build_runtime_rejects_bad_url() {
		let settings = Settings {
			bridge_url: "not a url".into(),
			..Settings::resolve(&CliConfig::new(), &RuntimeOverrides::default())
		};
		assert!(build_runtime(settings, PathBuf::from("config.json")).is_err());
	}
}
