//! Persisted CLI configuration (`config.json` under the user config dir).


use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::ConfigKey;
use crate::error::{Result, WaError};

/// Schema version for the config file.
pub const SCHEMA_VERSION: u32 = 1;

/// Directory name under the user config dir.
const APP_DIR: &str = "wa-bridge";

/// Durable CLI settings. Every field is optional; unset fields fall back to
/// the built-in defaults at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
	#[serde(default)]
	pub schema: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bridge_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub poll_interval_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fast_poll_interval_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fast_poll_timeout_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_timeout_ms: Option<u64>,
}

impl CliConfig {
	/// Creates a config with current [`SCHEMA_VERSION`].
	pub fn new() -> Self {
		Self {
			schema: SCHEMA_VERSION,
			..Default::default()
		}
	}

	/// Parses and stores `value` under `key`.
	pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
		match key {
			ConfigKey::BridgeUrl => {
				// Reject URLs the client would refuse at startup.
				wa_runtime::BridgeClient::new(value)?;
				self.bridge_url = Some(value.to_string());
			}
			ConfigKey::PollIntervalMs => self.poll_interval_ms = Some(parse_millis(key, value)?),
			ConfigKey::FastPollIntervalMs => self.fast_poll_interval_ms = Some(parse_millis(key, value)?),
			ConfigKey::FastPollTimeoutMs => self.fast_poll_timeout_ms = Some(parse_millis(key, value)?),
			ConfigKey::RequestTimeoutMs => self.request_timeout_ms = Some(parse_millis(key, value)?),
		}
		Ok(())
	}

	pub fn unset(&mut self, key: ConfigKey) {
		match key {
			ConfigKey::BridgeUrl => self.bridge_url = None,
			ConfigKey::PollIntervalMs => self.poll_interval_ms = None,
			ConfigKey::FastPollIntervalMs => self.fast_poll_interval_ms = None,
			ConfigKey::FastPollTimeoutMs => self.fast_poll_timeout_ms = None,
			ConfigKey::RequestTimeoutMs => self.request_timeout_ms = None,
		}
	}
}

fn parse_millis(key: ConfigKey, value: &str) -> Result<u64> {
	let ms: u64 = value
		.trim()
		.parse()
		.map_err(|_| WaError::InvalidInput(format!("{} expects a whole number of milliseconds, got {value:?}", key_name(key))))?;
	if ms == 0 {
		return Err(WaError::InvalidInput(format!("{} must be greater than zero", key_name(key))));
	}
	Ok(ms)
}

fn key_name(key: ConfigKey) -> &'static str {
	match key {
		ConfigKey::BridgeUrl => "bridge-url",
		ConfigKey::PollIntervalMs => "poll-interval-ms",
		ConfigKey::FastPollIntervalMs => "fast-poll-interval-ms",
		ConfigKey::FastPollTimeoutMs => "fast-poll-timeout-ms",
		ConfigKey::RequestTimeoutMs => "request-timeout-ms",
	}
}

/// Default config file location.
///
/// `$XDG_CONFIG_HOME/wa-bridge/config.json`, falling back to the platform
/// config dir and finally the working directory.
pub fn default_path() -> PathBuf {
	std::env::var_os("XDG_CONFIG_HOME")
		.filter(|dir| !dir.is_empty())
		.map(PathBuf::from)
		.or_else(dirs::config_dir)
		.unwrap_or_else(|| PathBuf::from("."))
		.join(APP_DIR)
		.join("config.json")
}

/// Loads the config at `path`. A missing file yields an empty config.
pub fn load(path: &Path) -> Result<CliConfig> {
	Ok(load_json::<CliConfig>(path)?.unwrap_or_else(CliConfig::new))
}

pub fn save(path: &Path, config: &CliConfig) -> Result<()> {
	let config = CliConfig {
		schema: SCHEMA_VERSION,
		..config.clone()
	};
	save_json(path, &config)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
	let content = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
		Err(err) => return Err(config_error(path, err)),
	};
	serde_json::from_str(&content).map(Some).map_err(|err| config_error(path, err))
}

fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(|err| config_error(path, err))?;
	}
	fs::write(path, serde_json::to_string_pretty(data)?).map_err(|err| config_error(path, err))?;
	Ok(())
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> WaError {
	WaError::Config {
		path: path.to_path_buf(),
		message: err.to_string(),
	}
}
