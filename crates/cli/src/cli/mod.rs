
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use showctl_protocol::LightAction;

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for showctl.
#[derive(Parser, Debug)]
#[command(name = "showctl")]
#[command(about = "Remote control for a live show control server")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: json (default) or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Config file (default: <config dir>/showctl/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Server host or IP, overrides the config file
	#[arg(long, global = true, value_name = "HOST")]
	pub host: Option<String>,

	/// Server port, overrides the config file
	#[arg(long, global = true, value_name = "PORT")]
	pub port: Option<u16>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Check whether the server answers.
	Ping,
	/// Log in: checks the server is reachable, then reports its status.
	Login(LoginArgs),
	/// List scenes in server order.
	Scenes,
	/// Show the server status document.
	Status,
	/// Play a scene by name.
	Play {
		#[arg(value_name = "SCENE")]
		scene: String,
	},
	/// Pause the running scene.
	Pause,
	/// Stop the running scene.
	Stop,
	/// Set master volume.
	Volume {
		#[arg(value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=100))]
		level: u8,
	},
	/// Apply a lighting preset (full, dim, red, green, blue, off).
	Lights {
		#[arg(value_name = "ACTION")]
		action: LightAction,
	},
	/// Stop everything now.
	EmergencyStop,
	/// Reset the show system.
	Reset,
	/// Send an arbitrary command.
	Send(SendArgs),
	/// Probe periodically and print each connectivity notification.
	Watch(WatchArgs),
	/// Interactive operator console.
	Console,
	/// Inspect or create the config file.
	Config(ConfigArgs),
}

impl Commands {
	/// Name used in the output envelope.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Ping => "ping",
			Commands::Login(_) => "login",
			Commands::Scenes => "scenes",
			Commands::Status => "status",
			Commands::Play { .. } => "play",
			Commands::Pause => "pause",
			Commands::Stop => "stop",
			Commands::Volume { .. } => "volume",
			Commands::Lights { .. } => "lights",
			Commands::EmergencyStop => "emergency-stop",
			Commands::Reset => "reset",
			Commands::Send(_) => "send",
			Commands::Watch(_) => "watch",
			Commands::Console => "console",
			Commands::Config(args) => match args.action {
				ConfigAction::Show => "config.show",
				ConfigAction::Path => "config.path",
				ConfigAction::Init { .. } => "config.init",
			},
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
	#[arg(short, long, value_name = "NAME")]
	pub user: String,

	#[arg(short, long, value_name = "PASSWORD")]
	pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
	/// Command name, e.g. play_scene.
	#[arg(value_name = "NAME")]
	pub name: String,

	/// JSON payload. Objects are sent as-is, other values as {"value": ...}.
	#[arg(long, value_name = "JSON")]
	pub data: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
	/// Seconds between probes.
	#[arg(long, value_name = "SECS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
	pub interval: u64,

	/// Stop after this many probes (default: until interrupted).
	#[arg(long, value_name = "N")]
	pub count: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
	#[command(subcommand)]
	pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
	/// Print the effective configuration.
	Show,
	/// Print the config file location.
	Path,
	/// Write a config file with defaults (and any --host/--port).
	Init {
		/// Overwrite an existing file.
		#[arg(long)]
		force: bool,
	},
}
