//! Address of the remote control server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host used until the operator points the console somewhere else.
pub const DEFAULT_HOST: &str = "192.168.1.100";

/// Port of the control server's HTTP API.
pub const DEFAULT_PORT: u16 = 8080;

/// Host/port pair of the control server.
///
/// Replaced wholesale when the operator changes the target address. No
/// validation happens here; a malformed host simply fails at transport time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerEndpoint {
	pub host: String,
	pub port: u16,
}

impl ServerEndpoint {
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self { host: host.into(), port }
	}

	/// Endpoint on [`DEFAULT_PORT`].
	pub fn with_default_port(host: impl Into<String>) -> Self {
		Self::new(host, DEFAULT_PORT)
	}

	/// Returns `http://host:port`, bracketing IPv6 literals.
	pub fn base_url(&self) -> String {
		if self.host.contains(':') && !self.host.starts_with('[') {
			format!("http://[{}]:{}", self.host, self.port)
		} else {
			format!("http://{}:{}", self.host, self.port)
		}
	}

	/// Returns the absolute URL for an API path such as `/api/status`.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url(), path)
	}
}

impl Default for ServerEndpoint {
	fn default() -> Self {
		Self::new(DEFAULT_HOST, DEFAULT_PORT)
	}
}

impl fmt::Display for ServerEndpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.host.contains(':') && !self.host.starts_with('[') {
			write!(f, "[{}]:{}", self.host, self.port)
		} else {
			write!(f, "{}:{}", self.host, self.port)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_endpoint_targets_show_network() {
		let ep = ServerEndpoint::default();
		assert_eq!(ep.host, "192.168.1.100");
		assert_eq!(ep.port, 8080);
	}

	#[test]
	fn url_joins_path() {
		let ep = ServerEndpoint::new("10.0.0.5", 9000);
		assert_eq!(ep.url("/api/scenes"), "http://10.0.0.5:9000/api/scenes");
	}

	#[test]
	fn ipv6_host_is_bracketed() {
		let ep = ServerEndpoint::new("::1", 8080);
		assert_eq!(ep.base_url(), "http://[::1]:8080");
		assert_eq!(ep.to_string(), "[::1]:8080");
	}

	#[test]
	fn with_default_port_uses_api_port() {
		assert_eq!(ServerEndpoint::with_default_port("stage").port, DEFAULT_PORT);
	}
}
