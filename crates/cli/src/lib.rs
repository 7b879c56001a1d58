//! `showctl` command-line front end.
//!
//! One-shot commands, a heartbeat watcher and an interactive operator
//! console, all driving a single [`showctl::Console`] on blocking worker
//! threads.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod repl;
pub mod styles;
pub mod worker;
