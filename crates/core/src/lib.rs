//! showctl: remote-session client for live-show control servers
//!
//! This crate owns the logical session between an operator console and a show
//! control server: the configured server address, the connectivity state
//! machine, and the fan-out of connectivity notifications to any number of
//! subscribers. Every operation is one blocking HTTP exchange through a
//! [`Transport`]; run them off your UI or event loop.
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use showctl::{Command, Session, SessionConfig};
//!
//! let session = Arc::new(Session::with_config(SessionConfig::default())?);
//! session.set_server_address("10.0.0.20", 8080);
//!
//! let _sub = session.add_status_callback(|state| {
//!     tracing::info!(%state, "connectivity");
//!     Ok(())
//! });
//!
//! if session.test_connection() {
//!     for scene in session.fetch_scenes() {
//!         println!("{}: {}", scene.name, scene.description);
//!     }
//!     session.try_send_command(&Command::play_scene("Opening"))?;
//! }
//! ```
//!
//! Operations come in two flavours:
//!
//! - Sentinel forms (`test_connection`, `send_command`, `fetch_scenes`,
//!   `fetch_status`) never fail; they log and return `false`, `None` or an
//!   empty container.
//! - `try_*` forms return [`Result`] with the transport's reason.
//!
//! Both update the connectivity state and notify subscribers identically.

pub mod config;
pub mod console;
pub mod session;
pub mod subscribers;

pub use config::{NotifyPolicy, SessionConfig};
pub use console::{Console, ConsoleError, Credentials, Operator};
pub use session::Session;
pub use showctl_protocol::{
	Command, ConnectivityState, DEFAULT_HOST, DEFAULT_PORT, LightAction, Resource, SceneDescriptor, ServerEndpoint, StatusReport,
};
pub use showctl_runtime::{Error, ErrorKind, HttpTransport, Result, Timeouts, Transport};
pub use subscribers::{DeliveryFailure, HandlerId, ListenerError, ListenerResult, StatusListener, Subscription};

#[cfg(test)]
pub(crate) mod test_transport;
