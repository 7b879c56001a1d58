use std::path::Path;

use serde_json::json;

use crate::cli::ConfigAction;
use crate::config::ConsoleConfig;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat, ResultBuilder};

pub fn execute(
	action: ConfigAction,
	path: &Path,
	host: Option<String>,
	port: Option<u16>,
	format: OutputFormat,
) -> Result<()> {
	let command = match action {
		ConfigAction::Show => "config.show",
		ConfigAction::Path => "config.path",
		ConfigAction::Init { .. } => "config.init",
	};
	let data = match action {
		ConfigAction::Path => json!(path.display().to_string()),
		ConfigAction::Show => {
			let mut config = ConsoleConfig::load(path)?;
			config.apply_overrides(host, port);
			json!({
				"path": path.display().to_string(),
				"exists": path.exists(),
				"config": config,
			})
		}
		ConfigAction::Init { force } => {
			if path.exists() && !force {
				return Err(CliError::InvalidInput(format!(
					"{} already exists (use --force to overwrite)",
					path.display()
				)));
			}
			let mut config = ConsoleConfig::default();
			config.apply_overrides(host, port);
			config.save(path)?;
			tracing::info!(path = %path.display(), "wrote config");
			json!({ "path": path.display().to_string(), "config": config })
		}
	};

	output::print_result(&ResultBuilder::new(command).data(data).build(), format);
	Ok(())
}
