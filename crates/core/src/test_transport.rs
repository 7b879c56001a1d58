//! In-memory [`Transport`] that replays scripted replies.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;
use showctl_protocol::{Command, Resource, ServerEndpoint};
use showctl_runtime::{Error, Result, Transport};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
	Probe(ServerEndpoint),
	Invoke(ServerEndpoint, Command),
	Query(ServerEndpoint, Resource),
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
	replies: Mutex<VecDeque<Result<Value>>>,
	calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn push_ok(&self, value: Value) {
		self.replies.lock().push_back(Ok(value));
	}

	pub(crate) fn push_err(&self, err: Error) {
		self.replies.lock().push_back(Err(err));
	}

	pub(crate) fn push_refused(&self) {
		self.push_err(Error::NetworkUnavailable("connection refused".into()));
	}

	pub(crate) fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	fn next(&self, call: Call) -> Result<Value> {
		self.calls.lock().push(call);
		self.replies
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(Error::NetworkUnavailable("no scripted reply".into())))
	}
}

impl Transport for ScriptedTransport {
	fn probe(&self, endpoint: &ServerEndpoint) -> Result<()> {
		self.next(Call::Probe(endpoint.clone())).map(|_| ())
	}

	fn invoke(&self, endpoint: &ServerEndpoint, command: &Command) -> Result<Value> {
		self.next(Call::Invoke(endpoint.clone(), command.clone()))
	}

	fn query(&self, endpoint: &ServerEndpoint, resource: Resource) -> Result<Value> {
		self.next(Call::Query(endpoint.clone(), resource))
	}
}
