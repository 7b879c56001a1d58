//! Structured output envelope for all CLI commands.
//!
//! ## Output Contract
//!
//! Every one-shot command produces a result envelope on stdout:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": true,
//!   "command": "volume",
//!   "endpoint": "192.168.1.100:8080",
//!   "state": "connected",
//!   "data": { "response": { ... } },
//!   "timings": { "durationMs": 12 }
//! }
//! ```
//!
//! On failure `data` is replaced by
//! `"error": { "code": "SERVER_UNREACHABLE", "message": "...", "details": { ... } }`.
//!
//! Streaming commands (`watch`, `console`) additionally print one
//! [`ConnectivityEvent`] line per notification.

#[cfg(test)]
mod tests;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use showctl_protocol::{ConnectivityState, ServerEndpoint};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// JSON output (default)
	#[default]
	Json,
	/// Human-readable text
	Text,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,

	/// Whether the command succeeded
	pub ok: bool,

	/// Command name (e.g., "ping", "volume", "config.show")
	pub command: String,

	/// Server the command talked to
	#[serde(skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,

	/// Connectivity after the command
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<ConnectivityState>,

	/// Command-specific result data (only present on success)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Error information (only present on failure)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	/// Human-readable error message
	pub message: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Connection refused, DNS failure, unreachable host
	ServerUnreachable,
	/// Request exceeded its deadline
	Timeout,
	/// Server answered with a non-success status
	CommandRejected,
	/// Server answered with a body we could not use
	MalformedResponse,
	/// Missing credentials or not logged in
	AuthError,
	/// Invalid input provided
	InvalidInput,
	/// Config file could not be read or written
	ConfigError,
	/// File I/O error
	IoError,
	/// Unknown/internal error
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::ServerUnreachable => write!(f, "SERVER_UNREACHABLE"),
			ErrorCode::Timeout => write!(f, "TIMEOUT"),
			ErrorCode::CommandRejected => write!(f, "COMMAND_REJECTED"),
			ErrorCode::MalformedResponse => write!(f, "MALFORMED_RESPONSE"),
			ErrorCode::AuthError => write!(f, "AUTH_ERROR"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Timing information for the command
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	/// Total duration in milliseconds
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

/// Builder for constructing command results
pub struct ResultBuilder<T: Serialize> {
	command: String,
	endpoint: Option<String>,
	state: Option<ConnectivityState>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			endpoint: None,
			state: None,
			data: None,
			error: None,
			start_time: Instant::now(),
		}
	}

	/// Restart the timer, for builders created before the work starts.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn endpoint(mut self, endpoint: &ServerEndpoint) -> Self {
		self.endpoint = Some(endpoint.to_string());
		self
	}

	pub fn state(mut self, state: ConnectivityState) -> Self {
		self.state = Some(state);
		self
	}

	/// Set the successful result data
	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	/// Set an already classified error, details included
	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	/// Build the final result
	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();

		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			endpoint: self.endpoint,
			state: self.state,
			data: self.data,
			error: self.error,
			timings: Some(Timings::from(self.start_time.elapsed())),
		}
	}
}

/// Print a command result to stdout in the specified format
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			let _ = write_result_text(&mut io::stdout().lock(), result);
		}
	}
}

/// Human-readable rendering of a result.
pub fn write_result_text<T: Serialize>(out: &mut impl Write, result: &CommandResult<T>) -> io::Result<()> {
	if let (Some(endpoint), Some(state)) = (&result.endpoint, result.state) {
		writeln!(out, "[{}] {endpoint}", state_label(state))?;
	}

	if result.ok {
		if let Some(data) = &result.data {
			match serde_json::to_value(data) {
				Ok(serde_json::Value::String(s)) => writeln!(out, "{s}")?,
				Ok(serde_json::Value::Null) => {}
				Ok(value) => {
					if let Ok(json) = serde_json::to_string_pretty(&value) {
						writeln!(out, "{json}")?;
					}
				}
				Err(_) => {}
			}
		}
	} else if let Some(error) = &result.error {
		writeln!(out, "Error [{}]: {}", error.code, error.message)?;
		if let Some(details) = &error.details {
			if let Ok(json) = serde_json::to_string_pretty(details) {
				writeln!(out, "Details: {json}")?;
			}
		}
	}
	Ok(())
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("{} [{}]: {}", "Error".red().bold(), error.code, error.message);
}

/// One connectivity notification, as printed by `watch` and `console`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityEvent {
	/// Always "connectivity"
	pub event: String,
	pub state: ConnectivityState,
	pub endpoint: String,
	/// 1-based notification count
	pub seq: u64,
}

impl ConnectivityEvent {
	pub fn new(state: ConnectivityState, endpoint: &ServerEndpoint, seq: u64) -> Self {
		Self {
			event: "connectivity".to_string(),
			state,
			endpoint: endpoint.to_string(),
			seq,
		}
	}
}

/// Print a notification as a single line (NDJSON in json mode).
pub fn print_event(event: &ConnectivityEvent, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string(event) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			println!("#{} {} {}", event.seq, state_label(event.state), event.endpoint);
		}
	}
}

pub fn state_label(state: ConnectivityState) -> ColoredString {
	match state {
		ConnectivityState::Connected => state.as_str().green().bold(),
		ConnectivityState::Disconnected => state.as_str().red().bold(),
	}
}
