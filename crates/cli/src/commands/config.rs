use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::cli::ConfigAction;
use crate::config as config_store;
use crate::error::Result;
use crate::output::{self, ConfigData, OutputFormat, ResultBuilder};
use crate::runtime::{RuntimeOverrides, Settings};

pub fn execute(action: ConfigAction, path: &Path, bridge_url: Option<String>, format: OutputFormat, start: Instant) -> Result<()> {
	let overrides = RuntimeOverrides {
		bridge_url,
		..Default::default()
	};

	let effective = match action {
		ConfigAction::Path => None,
		ConfigAction::Show => {
			let file = config_store::load(path)?;
			Some(Settings::resolve(&file, &overrides))
		}
		ConfigAction::Set { key, value } => {
			let mut file = config_store::load(path)?;
			file.set(key, &value)?;
			config_store::save(path, &file)?;
			info!(target: "wa_cli", ?key, path = %path.display(), "config updated");
			Some(Settings::resolve(&file, &overrides))
		}
		ConfigAction::Unset { key } => {
			let mut file = config_store::load(path)?;
			file.unset(key);
			config_store::save(path, &file)?;
			info!(target: "wa_cli", ?key, path = %path.display(), "config key removed");
			Some(Settings::resolve(&file, &overrides))
		}
	};

	let effective = effective.map(serde_json::to_value).transpose()?;
	let result = ResultBuilder::new("config")
		.started_at(start)
		.data(ConfigData {
			path: path.to_path_buf(),
			effective,
		})
		.build();
	output::print_result(&result, format);
	Ok(())
}
