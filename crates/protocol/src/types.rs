//! Primitive values shared by the transport and the session.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured status document returned by `GET /api/status`.
///
/// The server owns the schema; the console only displays it.
pub type StatusReport = Map<String, Value>;

/// Whether the most recent network operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
	/// Last probe, command or query completed with a success status
	Connected,
	/// Last operation failed, or nothing has been attempted yet
	#[default]
	Disconnected,
}

impl ConnectivityState {
	pub fn is_connected(self) -> bool {
		matches!(self, ConnectivityState::Connected)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			ConnectivityState::Connected => "connected",
			ConnectivityState::Disconnected => "disconnected",
		}
	}
}

impl From<bool> for ConnectivityState {
	fn from(ok: bool) -> Self {
		if ok { ConnectivityState::Connected } else { ConnectivityState::Disconnected }
	}
}

impl fmt::Display for ConnectivityState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Read-only resources served under `/api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
	/// `GET /api/scenes`: ordered array of scene records
	Scenes,
	/// `GET /api/status`: status object
	Status,
}

impl Resource {
	pub fn name(self) -> &'static str {
		match self {
			Resource::Scenes => "scenes",
			Resource::Status => "status",
		}
	}

	pub fn path(self) -> &'static str {
		match self {
			Resource::Scenes => SCENES_PATH,
			Resource::Status => STATUS_PATH,
		}
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Health and status resource; also used as the connectivity probe.
pub const STATUS_PATH: &str = "/api/status";
/// Command submission endpoint.
pub const COMMAND_PATH: &str = "/api/command";
/// Scene listing endpoint.
pub const SCENES_PATH: &str = "/api/scenes";
