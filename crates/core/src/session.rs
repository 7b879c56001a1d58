//! The session client: connectivity state machine and operation entry points.
//!
//! # State machine
//!
//! Two states, [`ConnectivityState::Connected`] and
//! [`ConnectivityState::Disconnected`], starting disconnected. Every network
//! operation moves the session to `Connected` if its transport call succeeded
//! and to `Disconnected` otherwise, then notifies subscribers according to the
//! configured [`NotifyPolicy`](crate::NotifyPolicy) before returning.
//!
//! # Concurrency
//!
//! Operations are blocking and take `&self`; share a session with
//! `Arc<Session>`. Neither the state lock nor the subscriber registry lock is
//! held during the network call or while subscribers run. Without
//! [`SessionConfig::serialize`] concurrent operations race and the last one to
//! complete wins.


use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use showctl_protocol::{Command, ConnectivityState, Resource, SceneDescriptor, ServerEndpoint, StatusReport};
use showctl_runtime::{Error, HttpTransport, Result, Transport};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::subscribers::{HandlerId, ListenerResult, StatusListener, Subscribers, Subscription};

#[derive(Debug)]
struct SessionState {
	endpoint: ServerEndpoint,
	connectivity: ConnectivityState,
}

/// Logical session with one show control server.
pub struct Session<T = HttpTransport> {
	transport: T,
	config: SessionConfig,
	state: Mutex<SessionState>,
	operation: Mutex<()>,
	subscribers: Subscribers,
}

impl Session<HttpTransport> {
	/// Session over HTTP with default timeouts, targeting the default endpoint.
	pub fn new() -> Result<Self> {
		Self::with_config(SessionConfig::default())
	}

	/// Session over HTTP using `config.timeouts`.
	pub fn with_config(config: SessionConfig) -> Result<Self> {
		let transport = HttpTransport::with_timeouts(config.timeouts)?;
		Ok(Self::with_transport(transport, config))
	}
}

impl<T: Transport> Session<T> {
	pub fn with_transport(transport: T, config: SessionConfig) -> Self {
		let state = SessionState {
			endpoint: config.endpoint.clone(),
			connectivity: ConnectivityState::Disconnected,
		};
		Self {
			transport,
			config,
			state: Mutex::new(state),
			operation: Mutex::new(()),
			subscribers: Subscribers::new(),
		}
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	pub fn endpoint(&self) -> ServerEndpoint {
		self.state.lock().endpoint.clone()
	}

	/// Outcome of the most recently completed network operation.
	pub fn state(&self) -> ConnectivityState {
		self.state.lock().connectivity
	}

	pub fn is_connected(&self) -> bool {
		self.state().is_connected()
	}

	/// Replaces the server address. Connectivity is left as is until the next operation.
	pub fn set_endpoint(&self, endpoint: ServerEndpoint) {
		debug!(endpoint = %endpoint, "server address set");
		self.state.lock().endpoint = endpoint;
	}

	pub fn set_server_address(&self, host: impl Into<String>, port: u16) {
		self.set_endpoint(ServerEndpoint::new(host, port));
	}

	/// Sets the host and resets the port to [`DEFAULT_PORT`](showctl_protocol::DEFAULT_PORT).
	pub fn set_server_host(&self, host: impl Into<String>) {
		self.set_endpoint(ServerEndpoint::with_default_port(host));
	}

	/// Registers a callback invoked with the state after network operations.
	///
	/// No notification is sent on registration. The callback is removed when
	/// the returned [`Subscription`] is dropped; call
	/// [`Subscription::detach`] to keep it for the session's lifetime.
	pub fn add_status_callback<F>(&self, callback: F) -> Subscription
	where
		F: Fn(ConnectivityState) -> ListenerResult + Send + Sync + 'static,
	{
		self.subscribers.add(Arc::new(callback))
	}

	/// Registers an owned listener object.
	pub fn add_listener(&self, listener: Arc<dyn StatusListener>) -> Subscription {
		self.subscribers.add(listener)
	}

	/// Registers a listener without keeping it alive.
	///
	/// Once the caller drops its last `Arc`, the listener silently stops
	/// receiving notifications.
	pub fn subscribe_weak<L>(&self, listener: &Arc<L>) -> HandlerId
	where
		L: StatusListener + 'static,
	{
		let weak = Arc::downgrade(listener);
		self.subscribers.add_weak(weak as Weak<dyn StatusListener>)
	}

	pub fn unsubscribe(&self, id: HandlerId) -> bool {
		self.subscribers.remove(id)
	}

	pub fn subscriber_count(&self) -> usize {
		self.subscribers.len()
	}

	/// Probes `GET /api/status`.
	pub fn try_test_connection(&self) -> Result<()> {
		self.run("test_connection", |transport, endpoint| transport.probe(endpoint))
	}

	/// Probes the server; `true` iff it answered with a success status.
	pub fn test_connection(&self) -> bool {
		match self.try_test_connection() {
			Ok(()) => true,
			Err(e) => {
				warn!(endpoint = %self.endpoint(), error = %e, "Connection test failed");
				false
			}
		}
	}

	/// Posts a command and returns the server's response body.
	pub fn try_send_command(&self, command: &Command) -> Result<Value> {
		self.run("send_command", |transport, endpoint| transport.invoke(endpoint, command))
	}

	/// Posts `name` with `payload` (sent as `{}` when `None`).
	///
	/// Returns `None` on any failure; a rejected command and an unreachable
	/// server look the same here. Use [`try_send_command`](Self::try_send_command)
	/// to tell them apart.
	pub fn send_command(&self, name: &str, payload: Option<Map<String, Value>>) -> Option<Value> {
		let command = Command {
			name: name.to_string(),
			payload,
		};
		match self.try_send_command(&command) {
			Ok(body) => Some(body),
			Err(e) => {
				warn!(command = name, error = %e, "Command failed");
				None
			}
		}
	}

	/// Lists scenes in server order.
	pub fn try_fetch_scenes(&self) -> Result<Vec<SceneDescriptor>> {
		self.run("fetch_scenes", |transport, endpoint| transport.scenes(endpoint))
	}

	/// Lists scenes; empty on failure.
	pub fn fetch_scenes(&self) -> Vec<SceneDescriptor> {
		self.try_fetch_scenes().unwrap_or_else(|e| {
			warn!(error = %e, "Fetching scenes failed");
			Vec::new()
		})
	}

	/// Reads the server status document.
	pub fn try_fetch_status(&self) -> Result<StatusReport> {
		self.run("fetch_status", |transport, endpoint| match transport.query(endpoint, Resource::Status)? {
			Value::Object(map) => Ok(map),
			other => Err(Error::MalformedResponse(format!("status is not an object: {other}"))),
		})
	}

	/// Reads the server status; empty map on failure.
	pub fn fetch_status(&self) -> StatusReport {
		self.try_fetch_status().unwrap_or_else(|e| {
			warn!(error = %e, "Fetching status failed");
			StatusReport::new()
		})
	}

	/// Runs one network operation and applies its outcome to the state machine.
	fn run<R>(&self, operation: &'static str, call: impl FnOnce(&T, &ServerEndpoint) -> Result<R>) -> Result<R> {
		let _serial = self.config.serialize.then(|| self.operation.lock());
		let endpoint = self.endpoint();

		let result = call(&self.transport, &endpoint);

		let next = ConnectivityState::from(result.is_ok());
		let previous = std::mem::replace(&mut self.state.lock().connectivity, next);

		match &result {
			Ok(_) => debug!(operation, endpoint = %endpoint, "ok"),
			Err(e) => debug!(operation, endpoint = %endpoint, error = %e, "failed"),
		}
		if previous != next {
			info!(endpoint = %endpoint, from = %previous, to = %next, "Connectivity changed");
		}

		if self.config.notify.should_notify(previous, next) {
			let failures = self.subscribers.notify(next);
			if !failures.is_empty() {
				debug!(operation, failed = failures.len(), "some subscribers failed");
			}
		}

		result
	}
}

impl<T> std::fmt::Debug for Session<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("Session")
			.field("endpoint", &state.endpoint)
			.field("connectivity", &state.connectivity)
			.field("notify", &self.config.notify)
			.finish_non_exhaustive()
	}
}
