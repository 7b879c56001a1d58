//! Transport to the show control server.
//!
//! One blocking HTTP exchange per call, normalized into [`Result`]. This crate
//! knows nothing about sessions, subscribers or connectivity state; see the
//! `showctl` crate for that.

pub mod error;
pub mod transport;

pub use error::{Error, ErrorKind, Result};
pub use transport::{HttpTransport, Timeouts, Transport, decode_scenes};
