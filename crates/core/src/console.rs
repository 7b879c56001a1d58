//! Operator intents on top of a shared [`Session`].
//!
//! This is the controller half of an operator console with the rendering
//! removed: a login gate, the scene list and current selection, and one
//! method per control the operator can press. Any number of front ends can
//! drive the same [`Console`]; it holds the session by `Arc`, never through a
//! global.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use showctl_protocol::{Command, LightAction, SceneDescriptor, ServerEndpoint, StatusReport};
use showctl_runtime::{Error, HttpTransport, Transport};
use thiserror::Error;
use tracing::info;

use crate::session::Session;

/// Errors from operator intents.
#[derive(Debug, Error)]
pub enum ConsoleError {
	#[error("username and password are required")]
	MissingCredentials,

	#[error("control server unreachable at {endpoint}: {source}")]
	Unreachable {
		endpoint: ServerEndpoint,
		#[source]
		source: Error,
	},

	#[error("no scene selected")]
	NoSceneSelected,

	#[error("unknown scene: {0}")]
	UnknownScene(String),

	#[error(transparent)]
	Transport(#[from] Error),
}

impl ConsoleError {
	/// Underlying transport failure, if there was a network exchange.
	pub fn transport_error(&self) -> Option<&Error> {
		match self {
			ConsoleError::Unreachable { source, .. } | ConsoleError::Transport(source) => Some(source),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Login form contents. Passed through, never checked against the server.
#[derive(Clone)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

impl Credentials {
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// The operator currently at the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
	pub username: String,
	pub server: ServerEndpoint,
}

#[derive(Default)]
struct ConsoleState {
	operator: Option<Operator>,
	scenes: Vec<SceneDescriptor>,
	selected: Option<SceneDescriptor>,
}

/// Operator console controller.
pub struct Console<T = HttpTransport> {
	session: Arc<Session<T>>,
	state: Mutex<ConsoleState>,
}

impl<T: Transport> Console<T> {
	pub fn new(session: Arc<Session<T>>) -> Self {
		Self {
			session,
			state: Mutex::new(ConsoleState::default()),
		}
	}

	pub fn session(&self) -> &Arc<Session<T>> {
		&self.session
	}

	/// Logs in against the session's current endpoint.
	///
	/// Both fields must be non-empty; that is checked locally with no network
	/// call. The server is then probed, and only a reachable server completes
	/// the login.
	pub fn login(&self, credentials: Credentials) -> Result<Operator> {
		if credentials.username.trim().is_empty() || credentials.password.is_empty() {
			return Err(ConsoleError::MissingCredentials);
		}

		let endpoint = self.session.endpoint();
		self.session
			.try_test_connection()
			.map_err(|source| ConsoleError::Unreachable {
				endpoint: endpoint.clone(),
				source,
			})?;

		let operator = Operator {
			username: credentials.username.trim().to_string(),
			server: endpoint,
		};
		info!(user = %operator.username, server = %operator.server, "Operator logged in");
		self.state.lock().operator = Some(operator.clone());
		Ok(operator)
	}

	/// Forgets the operator and the scene selection; the session is untouched.
	pub fn logout(&self) -> Option<Operator> {
		let mut state = self.state.lock();
		state.selected = None;
		let operator = state.operator.take();
		if let Some(op) = &operator {
			info!(user = %op.username, "Operator logged out");
		}
		operator
	}

	pub fn operator(&self) -> Option<Operator> {
		self.state.lock().operator.clone()
	}

	pub fn is_logged_in(&self) -> bool {
		self.state.lock().operator.is_some()
	}

	/// Fetches the scene list and remembers it for selection by name.
	pub fn load_scenes(&self) -> Result<Vec<SceneDescriptor>> {
		let scenes = self.session.try_fetch_scenes()?;
		self.state.lock().scenes = scenes.clone();
		Ok(scenes)
	}

	/// Scenes from the last successful [`load_scenes`](Self::load_scenes).
	pub fn scenes(&self) -> Vec<SceneDescriptor> {
		self.state.lock().scenes.clone()
	}

	pub fn select_scene(&self, scene: SceneDescriptor) {
		self.state.lock().selected = Some(scene);
	}

	/// Selects a scene from the loaded list by exact name.
	pub fn select_scene_named(&self, name: &str) -> Result<SceneDescriptor> {
		let mut state = self.state.lock();
		let scene = state
			.scenes
			.iter()
			.find(|scene| scene.name == name)
			.cloned()
			.ok_or_else(|| ConsoleError::UnknownScene(name.to_string()))?;
		state.selected = Some(scene.clone());
		Ok(scene)
	}

	pub fn selected_scene(&self) -> Option<SceneDescriptor> {
		self.state.lock().selected.clone()
	}

	/// Plays the selected scene.
	pub fn play_selected(&self) -> Result<Value> {
		let scene = self.selected_scene().ok_or(ConsoleError::NoSceneSelected)?;
		self.play(&scene.name)
	}

	pub fn play(&self, scene_name: &str) -> Result<Value> {
		self.send(Command::play_scene(scene_name))
	}

	pub fn pause(&self) -> Result<Value> {
		self.send(Command::pause_scene())
	}

	pub fn stop(&self) -> Result<Value> {
		self.send(Command::stop_scene())
	}

	pub fn set_volume(&self, volume: u8) -> Result<Value> {
		self.send(Command::set_volume(volume))
	}

	pub fn lights(&self, action: LightAction) -> Result<Value> {
		self.send(Command::lights(action))
	}

	pub fn emergency_stop(&self) -> Result<Value> {
		let result = self.send(Command::emergency_stop());
		match &result {
			Ok(_) => info!("Emergency stop issued"),
			Err(e) => tracing::error!(error = %e, "Emergency stop failed"),
		}
		result
	}

	pub fn system_reset(&self) -> Result<Value> {
		self.send(Command::system_reset())
	}

	/// Re-reads server status, refreshing connectivity on the way.
	pub fn refresh(&self) -> Result<StatusReport> {
		Ok(self.session.try_fetch_status()?)
	}

	pub fn send(&self, command: Command) -> Result<Value> {
		Ok(self.session.try_send_command(&command)?)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use showctl_protocol::ConnectivityState;

	use super::*;
	use crate::config::SessionConfig;
	use crate::test_transport::{Call, ScriptedTransport};

	fn console() -> (Arc<ScriptedTransport>, Console<Arc<ScriptedTransport>>) {
		let transport = Arc::new(ScriptedTransport::new());
		let session = Session::with_transport(Arc::clone(&transport), SessionConfig::default());
		(transport, Console::new(Arc::new(session)))
	}

	fn sent_commands(transport: &ScriptedTransport) -> Vec<Value> {
		transport
			.calls()
			.into_iter()
			.filter_map(|call| match call {
				Call::Invoke(_, command) => Some(command.to_body()),
				_ => None,
			})
			.collect()
	}

	#[test]
	fn login_requires_both_fields_without_touching_network() {
		let (transport, console) = console();
		assert!(matches!(console.login(Credentials::new("", "secret")), Err(ConsoleError::MissingCredentials)));
		assert!(matches!(console.login(Credentials::new("mei", "")), Err(ConsoleError::MissingCredentials)));
		assert!(transport.calls().is_empty());
		assert!(!console.is_logged_in());
	}

	#[test]
	fn login_succeeds_when_server_reachable() {
		let (transport, console) = console();
		console.session().set_server_address("192.168.1.50", 8080);
		transport.push_ok(json!({}));

		let operator = console.login(Credentials::new(" mei ", "secret")).unwrap();
		assert_eq!(operator.username, "mei");
		assert_eq!(operator.server, ServerEndpoint::new("192.168.1.50", 8080));
		assert_eq!(console.operator(), Some(operator));
		assert_eq!(console.session().state(), ConnectivityState::Connected);
	}

	#[test]
	fn login_fails_when_server_unreachable() {
		let (transport, console) = console();
		transport.push_refused();

		let err = console.login(Credentials::new("mei", "secret")).unwrap_err();
		assert!(matches!(err, ConsoleError::Unreachable { .. }));
		assert!(err.transport_error().is_some());
		assert!(!console.is_logged_in());
	}

	#[test]
	fn credentials_debug_hides_password() {
		let rendered = format!("{:?}", Credentials::new("mei", "hunter2"));
		assert!(rendered.contains("mei"));
		assert!(!rendered.contains("hunter2"));
	}

	#[test]
	fn play_selected_requires_selection() {
		let (transport, console) = console();
		assert!(matches!(console.play_selected(), Err(ConsoleError::NoSceneSelected)));
		assert!(transport.calls().is_empty());
	}

	#[test]
	fn select_by_name_uses_loaded_scenes() {
		let (transport, console) = console();
		transport.push_ok(json!([
			{"name": "Opening", "description": "Curtain up"},
			{"name": "Finale", "description": "Confetti"}
		]));
		transport.push_ok(json!({"ok": true}));

		assert_eq!(console.load_scenes().unwrap().len(), 2);
		assert!(matches!(console.select_scene_named("Intermission"), Err(ConsoleError::UnknownScene(_))));
		console.select_scene_named("Finale").unwrap();
		console.play_selected().unwrap();

		assert_eq!(
			sent_commands(&transport),
			[json!({"command": "play_scene", "data": {"scene_name": "Finale"}})]
		);
	}

	#[test]
	fn controls_send_known_commands() {
		let (transport, console) = console();
		for _ in 0..6 {
			transport.push_ok(json!({"ok": true}));
		}

		console.pause().unwrap();
		console.stop().unwrap();
		console.set_volume(75).unwrap();
		console.lights(LightAction::Dim).unwrap();
		console.emergency_stop().unwrap();
		console.system_reset().unwrap();

		assert_eq!(
			sent_commands(&transport),
			[
				json!({"command": "pause_scene", "data": {}}),
				json!({"command": "stop_scene", "data": {}}),
				json!({"command": "set_volume", "data": {"volume": 75}}),
				json!({"command": "lights_control", "data": {"action": "dim"}}),
				json!({"command": "emergency_stop", "data": {}}),
				json!({"command": "system_reset", "data": {}}),
			]
		);
	}

	#[test]
	fn logout_clears_operator_and_selection() {
		let (transport, console) = console();
		transport.push_ok(json!({}));
		console.login(Credentials::new("mei", "secret")).unwrap();
		console.select_scene(SceneDescriptor::new("Opening", ""));

		let operator = console.logout().unwrap();
		assert_eq!(operator.username, "mei");
		assert!(console.selected_scene().is_none());
		assert!(!console.is_logged_in());
		assert_eq!(console.session().state(), ConnectivityState::Connected);
	}

	#[test]
	fn command_failure_carries_reason() {
		let (transport, console) = console();
		transport.push_err(Error::Protocol {
			status: 500,
			reason: "dimmer rack offline".into(),
		});

		let err = console.lights(LightAction::Red).unwrap_err();
		assert_eq!(err.transport_error().and_then(Error::status), Some(500));
		assert!(err.to_string().contains("dimmer rack offline"));
	}
}
