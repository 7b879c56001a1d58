//! Session construction options.

use serde::{Deserialize, Serialize};
use showctl_protocol::{ConnectivityState, ServerEndpoint};
use showctl_runtime::Timeouts;

/// When subscribers hear about the connectivity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
	/// After every network operation, even if the state did not change.
	///
	/// Consumers can treat this as a liveness heartbeat.
	#[default]
	EveryOperation,
	/// Only when the state actually flips.
	OnChange,
}

impl NotifyPolicy {
	pub fn should_notify(self, previous: ConnectivityState, next: ConnectivityState) -> bool {
		match self {
			NotifyPolicy::EveryOperation => true,
			NotifyPolicy::OnChange => previous != next,
		}
	}
}

/// Options for [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionConfig {
	/// Initial server address.
	pub endpoint: ServerEndpoint,
	/// Per-operation timeouts for the default HTTP transport.
	pub timeouts: Timeouts,
	pub notify: NotifyPolicy,
	/// Hold a lock across each whole operation so concurrent callers are
	/// serialized. Off by default: concurrent operations race and the last
	/// one to complete decides the state.
	///
	/// With this on, subscribers must not call session operations.
	pub serialize: bool,
}

impl SessionConfig {
	pub fn with_endpoint(endpoint: ServerEndpoint) -> Self {
		Self {
			endpoint,
			..Self::default()
		}
	}
}
