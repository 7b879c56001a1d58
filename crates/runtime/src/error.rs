//! Error types for the transport.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a single exchange with the control server can end in.
#[derive(Debug, Error)]
pub enum Error {
	/// Connection refused, DNS failure, reset, or any other failure to talk to the server.
	#[error("Server unreachable: {0}")]
	NetworkUnavailable(String),

	/// No complete response within the operation's timeout.
	#[error("Timeout after {}ms: {url}", timeout.as_millis())]
	Timeout { url: String, timeout: Duration },

	/// Server answered with a non-success status code.
	#[error("Server returned {status}: {reason}")]
	Protocol { status: u16, reason: String },

	/// Body could not be parsed into the expected structure.
	#[error("Malformed response: {0}")]
	MalformedResponse(String),

	/// HTTP client could not be constructed (TLS backend, resolver).
	#[error("Failed to create HTTP client: {0}")]
	ClientBuild(String),
}

/// Coarse failure classes.
///
/// The session collapses all of them into "failed"; they exist for callers
/// that want to tell an operator more than that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	NetworkUnavailable,
	ProtocolError,
	MalformedResponse,
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::NetworkUnavailable(_) | Error::Timeout { .. } | Error::ClientBuild(_) => ErrorKind::NetworkUnavailable,
			Error::Protocol { .. } => ErrorKind::ProtocolError,
			Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
		}
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout { .. })
	}

	/// HTTP status code, if the server answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Error::Protocol { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Human-readable diagnostic suitable for logs and failure indicators.
	pub fn reason(&self) -> String {
		self.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kinds_collapse_to_three_classes() {
		let timeout = Error::Timeout {
			url: "http://stage:8080/api/status".into(),
			timeout: Duration::from_secs(5),
		};
		assert_eq!(timeout.kind(), ErrorKind::NetworkUnavailable);
		assert!(timeout.is_timeout());
		assert_eq!(Error::NetworkUnavailable("refused".into()).kind(), ErrorKind::NetworkUnavailable);
		assert_eq!(
			Error::Protocol {
				status: 500,
				reason: "boom".into()
			}
			.kind(),
			ErrorKind::ProtocolError
		);
		assert_eq!(Error::MalformedResponse("eof".into()).kind(), ErrorKind::MalformedResponse);
	}

	#[test]
	fn timeout_message_reports_millis() {
		let err = Error::Timeout {
			url: "http://stage:8080/api/command".into(),
			timeout: Duration::from_secs(10),
		};
		assert_eq!(err.reason(), "Timeout after 10000ms: http://stage:8080/api/command");
	}

	#[test]
	fn status_only_for_protocol_errors() {
		let err = Error::Protocol {
			status: 503,
			reason: "Service Unavailable".into(),
		};
		assert_eq!(err.status(), Some(503));
		assert_eq!(Error::NetworkUnavailable("x".into()).status(), None);
	}
}
