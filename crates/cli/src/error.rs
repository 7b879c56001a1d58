use showctl::ConsoleError;
use showctl_runtime::{Error as TransportError, ErrorKind};
use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("not logged in")]
	NotLoggedIn,

	#[error("config error: {0:#}")]
	Config(anyhow::Error),

	#[error("worker task failed: {0}")]
	Worker(String),

	#[error(transparent)]
	Console(#[from] ConsoleError),

	#[error(transparent)]
	Transport(#[from] TransportError),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for CliError {
	fn from(err: tokio::task::JoinError) -> Self {
		CliError::Worker(err.to_string())
	}
}

/// Map a transport failure onto an envelope code, keeping the reason.
fn classify_transport(err: &TransportError) -> (ErrorCode, String, Option<serde_json::Value>) {
	let code = if err.is_timeout() {
		ErrorCode::Timeout
	} else {
		match err.kind() {
			ErrorKind::NetworkUnavailable => ErrorCode::ServerUnreachable,
			ErrorKind::ProtocolError => ErrorCode::CommandRejected,
			ErrorKind::MalformedResponse => ErrorCode::MalformedResponse,
		}
	};
	let details = err.status().map(|status| serde_json::json!({ "status": status }));
	(code, err.to_string(), details)
}

impl CliError {
	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::InvalidInput(msg) => (ErrorCode::InvalidInput, msg.clone(), None),
			CliError::NotLoggedIn => (ErrorCode::AuthError, "Not logged in; use `login <user> <password>`".to_string(), None),
			CliError::Config(err) => (ErrorCode::ConfigError, format!("{err:#}"), None),
			CliError::Worker(msg) => (ErrorCode::InternalError, msg.clone(), None),
			CliError::Console(err) => match err {
				ConsoleError::MissingCredentials => (ErrorCode::AuthError, err.to_string(), None),
				ConsoleError::NoSceneSelected | ConsoleError::UnknownScene(_) => {
					(ErrorCode::InvalidInput, err.to_string(), None)
				}
				ConsoleError::Unreachable { endpoint, source } => {
					let (code, _, _) = classify_transport(source);
					(
						code,
						err.to_string(),
						Some(serde_json::json!({ "endpoint": endpoint.to_string() })),
					)
				}
				ConsoleError::Transport(source) => classify_transport(source),
			},
			CliError::Transport(err) => classify_transport(err),
			CliError::Io(err) => (ErrorCode::IoError, err.to_string(), None),
		};

		CommandError { code, message, details }
	}
}
