//! Wire types for the show control server API.
//!
//! This crate contains the serde-serializable types exchanged with the remote
//! control server over HTTP/JSON. These types represent the "protocol layer":
//! the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization and a few constructors
//! - **1:1 with the server API**: `/api/status`, `/api/command`, `/api/scenes`
//! - **Opaque where the server owns the schema**: command payloads, status
//!   reports and extra scene fields pass through untouched
//!
//! The transport lives in `showctl-runtime`; the session state machine in `showctl`.

pub mod command;
pub mod endpoint;
pub mod scene;
pub mod types;

pub use command::*;
pub use endpoint::*;
pub use scene::*;
pub use types::*;
