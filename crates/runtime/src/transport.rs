//! Blocking HTTP transport to the control server.
//!
//! Each call is one request with its own timeout. Whatever goes wrong (refused
//! connection, timeout, non-success status, unparseable body) comes back as an
//! [`Error`] value; nothing here panics or retries.


use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use showctl_protocol::{COMMAND_PATH, Command, Resource, STATUS_PATH, SceneDescriptor, ServerEndpoint};
use tracing::debug;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("showctl/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body copied into a [`Error::Protocol`] reason.
const MAX_REASON_BODY: usize = 200;

/// One network exchange per call, normalized into [`Result`].
///
/// Implementations are stateless with respect to sessions: they hold no
/// connectivity flag and no subscribers.
pub trait Transport: Send + Sync {
	/// Health check against `GET /api/status`.
	fn probe(&self, endpoint: &ServerEndpoint) -> Result<()>;

	/// Posts `command` to `/api/command` and returns the parsed response body
	/// (`Value::Null` when the body is empty).
	fn invoke(&self, endpoint: &ServerEndpoint, command: &Command) -> Result<Value>;

	/// Reads a resource; the body must have the shape the resource promises.
	fn query(&self, endpoint: &ServerEndpoint, resource: Resource) -> Result<Value>;

	/// Reads `/api/scenes` and decodes every entry, in server order.
	fn scenes(&self, endpoint: &ServerEndpoint) -> Result<Vec<SceneDescriptor>> {
		decode_scenes(self.query(endpoint, Resource::Scenes)?)
	}
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
	fn probe(&self, endpoint: &ServerEndpoint) -> Result<()> {
		(**self).probe(endpoint)
	}

	fn invoke(&self, endpoint: &ServerEndpoint, command: &Command) -> Result<Value> {
		(**self).invoke(endpoint, command)
	}

	fn query(&self, endpoint: &ServerEndpoint, resource: Resource) -> Result<Value> {
		(**self).query(endpoint, resource)
	}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
	fn probe(&self, endpoint: &ServerEndpoint) -> Result<()> {
		(**self).probe(endpoint)
	}

	fn invoke(&self, endpoint: &ServerEndpoint, command: &Command) -> Result<Value> {
		(**self).invoke(endpoint, command)
	}

	fn query(&self, endpoint: &ServerEndpoint, resource: Resource) -> Result<Value> {
		(**self).query(endpoint, resource)
	}
}

/// Per-operation request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
	pub probe: Duration,
	pub query: Duration,
	pub command: Duration,
}

impl Timeouts {
	pub const DEFAULT_PROBE: Duration = Duration::from_secs(5);
	pub const DEFAULT_QUERY: Duration = Duration::from_secs(5);
	pub const DEFAULT_COMMAND: Duration = Duration::from_secs(10);

	/// Same timeout for every operation.
	pub fn uniform(timeout: Duration) -> Self {
		Self {
			probe: timeout,
			query: timeout,
			command: timeout,
		}
	}
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			probe: Self::DEFAULT_PROBE,
			query: Self::DEFAULT_QUERY,
			command: Self::DEFAULT_COMMAND,
		}
	}
}

/// [`Transport`] over a pooled blocking `reqwest` client.
///
/// Must be built and called off async runtime threads (use
/// `tokio::task::spawn_blocking` from async code).
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
	timeouts: Timeouts,
}

impl HttpTransport {
	pub fn new() -> Result<Self> {
		Self::with_timeouts(Timeouts::default())
	}

	pub fn with_timeouts(timeouts: Timeouts) -> Result<Self> {
		let client = Client::builder()
			.user_agent(USER_AGENT)
			.build()
			.map_err(|e| Error::ClientBuild(error_chain(&e)))?;
		Ok(Self { client, timeouts })
	}

	pub fn timeouts(&self) -> Timeouts {
		self.timeouts
	}

	fn send(&self, request: RequestBuilder, url: &str, timeout: Duration) -> Result<Response> {
		let response = request.timeout(timeout).send().map_err(|e| classify(e, url, timeout))?;
		let status = response.status();
		debug!(url, status = status.as_u16(), "response");

		if status.is_success() {
			return Ok(response);
		}

		let canonical = status.canonical_reason().unwrap_or("unknown status");
		let body = response.text().unwrap_or_default();
		let body = body.trim();
		let reason = if body.is_empty() {
			canonical.to_string()
		} else {
			format!("{canonical}: {}", truncate(body, MAX_REASON_BODY))
		};

		Err(Error::Protocol {
			status: status.as_u16(),
			reason,
		})
	}
}

impl Transport for HttpTransport {
	fn probe(&self, endpoint: &ServerEndpoint) -> Result<()> {
		let url = endpoint.url(STATUS_PATH);
		let timeout = self.timeouts.probe;
		self.send(self.client.get(&url), &url, timeout)?;
		Ok(())
	}

	fn invoke(&self, endpoint: &ServerEndpoint, command: &Command) -> Result<Value> {
		let url = endpoint.url(COMMAND_PATH);
		let timeout = self.timeouts.command;
		debug!(url, command = %command.name, "sending command");
		let response = self.send(self.client.post(&url).json(&command.to_body()), &url, timeout)?;
		read_json(response, &url, timeout)
	}

	fn query(&self, endpoint: &ServerEndpoint, resource: Resource) -> Result<Value> {
		let url = endpoint.url(resource.path());
		let timeout = self.timeouts.query;
		let response = self.send(self.client.get(&url), &url, timeout)?;
		let value = read_json(response, &url, timeout)?;
		expect_shape(resource, value)
	}
}

/// Parses a success body; blank bodies become `Value::Null`.
fn read_json(response: Response, url: &str, timeout: Duration) -> Result<Value> {
	let bytes = response.bytes().map_err(|e| classify(e, url, timeout))?;
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}
	serde_json::from_slice(&bytes).map_err(|e| Error::MalformedResponse(format!("{url}: {e}")))
}

/// Rejects bodies that do not match what `resource` is documented to return.
pub(crate) fn expect_shape(resource: Resource, value: Value) -> Result<Value> {
	let matches = match resource {
		Resource::Scenes => value.is_array(),
		Resource::Status => value.is_object(),
	};
	if matches {
		return Ok(value);
	}

	let expected = match resource {
		Resource::Scenes => "array",
		Resource::Status => "object",
	};
	Err(Error::MalformedResponse(format!(
		"expected {expected} from {}, got {}",
		resource.path(),
		json_type(&value)
	)))
}

/// A scene list with any entry that is not a scene record is malformed as a whole.
pub fn decode_scenes(value: Value) -> Result<Vec<SceneDescriptor>> {
	serde_json::from_value(value).map_err(|e| Error::MalformedResponse(format!("{}: {e}", Resource::Scenes.path())))
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "empty body",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn classify(err: reqwest::Error, url: &str, timeout: Duration) -> Error {
	if err.is_timeout() {
		Error::Timeout {
			url: url.to_string(),
			timeout,
		}
	} else if err.is_decode() {
		Error::MalformedResponse(error_chain(&err))
	} else {
		Error::NetworkUnavailable(error_chain(&err))
	}
}

/// Joins an error with its sources; reqwest's top-level message hides the cause.
fn error_chain(err: &dyn std::error::Error) -> String {
	let mut msg = err.to_string();
	let mut source = err.source();
	while let Some(cause) = source {
		msg.push_str(": ");
		msg.push_str(&cause.to_string());
		source = cause.source();
	}
	msg
}

fn truncate(text: &str, max: usize) -> &str {
	match text.char_indices().nth(max) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}
