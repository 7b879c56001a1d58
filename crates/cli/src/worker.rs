//! Bridge between the async command loop and the blocking session.
//!
//! The HTTP transport must never run on a runtime thread, so the console is
//! built, used and dropped on the blocking pool. Connectivity notifications
//! are forwarded into an unbounded channel; the subscriber only enqueues, so
//! delivery never blocks a session operation.

use std::sync::Arc;

use showctl::{Console, Session, SessionConfig, Subscription};
use showctl_protocol::{ConnectivityState, ServerEndpoint};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;

pub struct SessionWorker {
	console: Arc<Console>,
	events: mpsc::UnboundedReceiver<ConnectivityState>,
	_subscription: Subscription,
}

impl SessionWorker {
	pub async fn start(config: SessionConfig) -> Result<Self> {
		let session = tokio::task::spawn_blocking(move || Session::with_config(config)).await??;
		let console = Arc::new(Console::new(Arc::new(session)));

		let (tx, events) = mpsc::unbounded_channel();
		let subscription = console.session().add_status_callback(move |state| {
			tx.send(state)?;
			Ok(())
		});
		debug!(endpoint = %console.session().endpoint(), "session worker started");

		Ok(Self {
			console,
			events,
			_subscription: subscription,
		})
	}

	/// Runs `f` against the console on the blocking pool.
	pub async fn run<R, F>(&self, f: F) -> Result<R>
	where
		F: FnOnce(&Console) -> R + Send + 'static,
		R: Send + 'static,
	{
		let console = Arc::clone(&self.console);
		Ok(tokio::task::spawn_blocking(move || f(&console)).await?)
	}

	/// Direct access for calls that never touch the network.
	pub fn console(&self) -> &Console {
		&self.console
	}

	pub fn endpoint(&self) -> ServerEndpoint {
		self.console.session().endpoint()
	}

	pub fn state(&self) -> ConnectivityState {
		self.console.session().state()
	}

	/// Notifications delivered since the last call, oldest first.
	pub fn drain_events(&mut self) -> Vec<ConnectivityState> {
		let mut drained = Vec::new();
		while let Ok(state) = self.events.try_recv() {
			drained.push(state);
		}
		drained
	}

	/// Releases the console off the runtime threads.
	pub async fn shutdown(self) {
		let Self {
			console,
			_subscription: subscription,
			..
		} = self;
		drop(subscription);
		if let Err(e) = tokio::task::spawn_blocking(move || drop(console)).await {
			debug!(error = %e, "session worker shutdown failed");
		}
	}
}

#[cfg(test)]
mod tests {
	use std::net::TcpListener;
	use std::time::Duration;

	use showctl_runtime::Timeouts;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	fn config_for(host: &str, port: u16) -> SessionConfig {
		SessionConfig {
			timeouts: Timeouts::uniform(Duration::from_secs(2)),
			..SessionConfig::with_endpoint(ServerEndpoint::new(host, port))
		}
	}

	#[tokio::test]
	async fn forwards_every_notification() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/status"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
			.mount(&server)
			.await;
		let addr = server.address();

		let mut worker = SessionWorker::start(config_for(&addr.ip().to_string(), addr.port())).await.unwrap();
		assert!(worker.run(|c| c.session().test_connection()).await.unwrap());
		assert!(worker.run(|c| c.session().test_connection()).await.unwrap());

		assert_eq!(
			worker.drain_events(),
			[ConnectivityState::Connected, ConnectivityState::Connected]
		);
		assert!(worker.drain_events().is_empty());
		worker.shutdown().await;
	}

	#[tokio::test]
	async fn unreachable_server_reports_disconnected() {
		let port = {
			let listener = TcpListener::bind("127.0.0.1:0").unwrap();
			listener.local_addr().unwrap().port()
		};

		let mut worker = SessionWorker::start(config_for("127.0.0.1", port)).await.unwrap();
		let reachable = worker.run(|c| c.session().test_connection()).await.unwrap();

		assert!(!reachable);
		assert_eq!(worker.state(), ConnectivityState::Disconnected);
		assert_eq!(worker.drain_events(), [ConnectivityState::Disconnected]);
		worker.shutdown().await;
	}
}
