//! Persistent console settings.
//!
//! Lives at `<config dir>/showctl/config.json` unless `--config` says
//! otherwise. A missing file means defaults; unknown keys are ignored and
//! missing keys fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use showctl::{NotifyPolicy, SessionConfig};
use showctl_protocol::{DEFAULT_HOST, DEFAULT_PORT, ServerEndpoint};
use showctl_runtime::Timeouts;
use tracing::debug;

use crate::error::{CliError, Result};

pub const CONFIG_DIR: &str = "showctl";
pub const CONFIG_FILE: &str = "config.json";

/// Request timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
	pub probe_ms: u64,
	pub query_ms: u64,
	pub command_ms: u64,
}

impl Default for TimeoutConfig {
	fn default() -> Self {
		let defaults = Timeouts::default();
		Self {
			probe_ms: defaults.probe.as_millis() as u64,
			query_ms: defaults.query.as_millis() as u64,
			command_ms: defaults.command.as_millis() as u64,
		}
	}
}

impl From<TimeoutConfig> for Timeouts {
	fn from(config: TimeoutConfig) -> Self {
		Timeouts {
			probe: Duration::from_millis(config.probe_ms),
			query: Duration::from_millis(config.query_ms),
			command: Duration::from_millis(config.command_ms),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
	pub host: String,
	pub port: u16,
	pub timeouts: TimeoutConfig,
	pub notify: NotifyPolicy,
	pub serialize: bool,
}

impl Default for ConsoleConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
			timeouts: TimeoutConfig::default(),
			notify: NotifyPolicy::default(),
			serialize: false,
		}
	}
}

impl ConsoleConfig {
	/// `<config dir>/showctl/config.json`, if the platform has a config dir.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
	}

	/// The explicit path if given, else [`default_path`](Self::default_path).
	pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
		match explicit {
			Some(path) => Ok(path.to_path_buf()),
			None => Self::default_path().ok_or_else(|| {
				CliError::Config(anyhow::anyhow!("no config directory on this platform; pass --config <FILE>"))
			}),
		}
	}

	/// Loads `path`, or defaults if the file does not exist.
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			debug!(path = %path.display(), "no config file, using defaults");
			return Ok(Self::default());
		}
		let raw = std::fs::read_to_string(path)
			.with_context(|| format!("reading {}", path.display()))
			.map_err(CliError::Config)?;
		let config = serde_json::from_str(&raw)
			.with_context(|| format!("parsing {}", path.display()))
			.map_err(CliError::Config)?;
		debug!(path = %path.display(), "loaded config");
		Ok(config)
	}

	/// Writes the config as pretty JSON, creating parent directories.
	pub fn save(&self, path: &Path) -> Result<()> {
		let write = || -> anyhow::Result<()> {
			if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
				std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
			}
			let json = serde_json::to_string_pretty(self)?;
			std::fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
			Ok(())
		};
		write().map_err(CliError::Config)
	}

	/// Applies `--host` / `--port`.
	pub fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>) {
		if let Some(host) = host {
			self.host = host;
		}
		if let Some(port) = port {
			self.port = port;
		}
	}

	pub fn endpoint(&self) -> ServerEndpoint {
		ServerEndpoint::new(self.host.clone(), self.port)
	}

	pub fn session_config(&self) -> SessionConfig {
		SessionConfig {
			endpoint: self.endpoint(),
			timeouts: self.timeouts.into(),
			notify: self.notify,
			serialize: self.serialize,
		}
	}
}
