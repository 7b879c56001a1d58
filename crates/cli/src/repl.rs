//! Interactive operator console.
//!
//! Reads one command per line from stdin and drives a single shared
//! session, the way the tablet screens do: log in first, then pick scenes
//! and press controls. Connectivity is printed whenever it changes.

use std::io::IsTerminal;

use serde_json::{Value, json};
use showctl::Credentials;
use showctl_protocol::{DEFAULT_PORT, LightAction};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{CliError, Result};
use crate::output::{self, ConnectivityEvent, OutputFormat, ResultBuilder};
use crate::worker::SessionWorker;

pub const HELP: &str = "\
commands:
  login <user> <password>   check the server and log in
  logout                    forget the operator
  server <host> [port]      point at another server (port defaults to 8080)
  scenes                    list scenes
  select <name>             select a scene from the list
  play [name]               play the named or selected scene
  pause | stop              transport controls
  volume <0-100>            set master volume
  lights <preset>           full, dim, red, green, blue, off
  estop                     emergency stop
  reset                     system reset
  refresh                   reload server status
  status                    show console state (no network)
  help                      this text
  quit                      leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
	Login { user: String, password: String },
	Logout,
	Server { host: String, port: Option<u16> },
	Scenes,
	Select(String),
	Play(Option<String>),
	Pause,
	Stop,
	Volume(u8),
	Lights(LightAction),
	EmergencyStop,
	Reset,
	Refresh,
	Status,
	Help,
	Quit,
}

impl ReplCommand {
	fn name(&self) -> &'static str {
		match self {
			ReplCommand::Login { .. } => "login",
			ReplCommand::Logout => "logout",
			ReplCommand::Server { .. } => "server",
			ReplCommand::Scenes => "scenes",
			ReplCommand::Select(_) => "select",
			ReplCommand::Play(_) => "play",
			ReplCommand::Pause => "pause",
			ReplCommand::Stop => "stop",
			ReplCommand::Volume(_) => "volume",
			ReplCommand::Lights(_) => "lights",
			ReplCommand::EmergencyStop => "emergency-stop",
			ReplCommand::Reset => "reset",
			ReplCommand::Refresh => "refresh",
			ReplCommand::Status => "status",
			ReplCommand::Help => "help",
			ReplCommand::Quit => "quit",
		}
	}

	/// Controls and queries need a logged-in operator.
	fn requires_login(&self) -> bool {
		!matches!(
			self,
			ReplCommand::Login { .. } | ReplCommand::Server { .. } | ReplCommand::Status | ReplCommand::Help | ReplCommand::Quit
		)
	}
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
///
/// Scene names may contain spaces: everything after the verb is the name.
pub fn parse_line(line: &str) -> std::result::Result<Option<ReplCommand>, String> {
	let line = line.trim();
	if line.is_empty() || line.starts_with('#') {
		return Ok(None);
	}
	let (verb, rest) = match line.split_once(char::is_whitespace) {
		Some((verb, rest)) => (verb, rest.trim()),
		None => (line, ""),
	};
	let args: Vec<&str> = rest.split_whitespace().collect();

	let command = match verb.to_ascii_lowercase().as_str() {
		"login" => match args.as_slice() {
			[user, password] => ReplCommand::Login {
				user: user.to_string(),
				password: password.to_string(),
			},
			_ => return Err("usage: login <user> <password>".into()),
		},
		"logout" => ReplCommand::Logout,
		"server" => match args.as_slice() {
			[host] => ReplCommand::Server {
				host: host.to_string(),
				port: None,
			},
			[host, port] => ReplCommand::Server {
				host: host.to_string(),
				port: Some(port.parse().map_err(|_| format!("invalid port: {port}"))?),
			},
			_ => return Err("usage: server <host> [port]".into()),
		},
		"scenes" => ReplCommand::Scenes,
		"select" if !rest.is_empty() => ReplCommand::Select(rest.to_string()),
		"select" => return Err("usage: select <name>".into()),
		"play" => ReplCommand::Play((!rest.is_empty()).then(|| rest.to_string())),
		"pause" => ReplCommand::Pause,
		"stop" => ReplCommand::Stop,
		"volume" => match rest.parse::<u8>() {
			Ok(level) if level <= 100 => ReplCommand::Volume(level),
			_ => return Err("usage: volume <0-100>".into()),
		},
		"lights" => ReplCommand::Lights(rest.parse()?),
		"estop" | "emergency-stop" => ReplCommand::EmergencyStop,
		"reset" => ReplCommand::Reset,
		"refresh" => ReplCommand::Refresh,
		"status" => ReplCommand::Status,
		"help" | "?" => ReplCommand::Help,
		"quit" | "exit" => ReplCommand::Quit,
		other => return Err(format!("unknown command: {other} (try `help`)")),
	};
	Ok(Some(command))
}

/// Runs the console until `quit` or end of input.
pub async fn run(worker: &mut SessionWorker, format: OutputFormat) -> Result<()> {
	let interactive = std::io::stdin().is_terminal();
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut shown = None;
	let mut seq = 0u64;

	if interactive {
		eprintln!("showctl console, server {} (type `help`)", worker.endpoint());
	}

	loop {
		if interactive {
			eprint!("showctl> ");
		}
		let Some(line) = lines.next_line().await? else {
			break;
		};

		let command = match parse_line(&line) {
			Ok(Some(command)) => command,
			Ok(None) => continue,
			Err(usage) => {
				report_error(CliError::InvalidInput(usage), "console", format);
				continue;
			}
		};
		if command == ReplCommand::Quit {
			break;
		}
		if command == ReplCommand::Help {
			println!("{HELP}");
			continue;
		}

		let name = command.name();
		match execute(worker, command).await {
			Ok(data) => {
				let result = ResultBuilder::new(name)
					.endpoint(&worker.endpoint())
					.state(worker.state())
					.data(data)
					.build();
				output::print_result(&result, format);
			}
			Err(err) => report_error(err, name, format),
		}

		// Only flips are shown; every-operation heartbeats are collapsed.
		let endpoint = worker.endpoint();
		for state in worker.drain_events() {
			if shown != Some(state) {
				shown = Some(state);
				seq += 1;
				output::print_event(&ConnectivityEvent::new(state, &endpoint, seq), format);
			}
		}
	}

	if let Some(operator) = worker.console().logout() {
		tracing::debug!(user = %operator.username, "console closed");
	}
	Ok(())
}

fn report_error(err: CliError, command: &str, format: OutputFormat) {
	let cmd_error = err.to_command_error();
	match format {
		OutputFormat::Text => output::print_error_stderr(&cmd_error),
		OutputFormat::Json => {
			let result: output::CommandResult<()> = ResultBuilder::new(command).command_error(cmd_error).build();
			output::print_result(&result, format);
		}
	}
}

async fn execute(worker: &SessionWorker, command: ReplCommand) -> Result<Value> {
	if command.requires_login() && !worker.console().is_logged_in() {
		return Err(CliError::NotLoggedIn);
	}

	let data = match command {
		ReplCommand::Login { user, password } => {
			let credentials = Credentials::new(user, password);
			let operator = worker.run(move |c| c.login(credentials)).await??;
			json!({ "operator": operator })
		}
		ReplCommand::Logout => json!({ "operator": worker.console().logout() }),
		ReplCommand::Server { host, port } => {
			let session = worker.console().session();
			session.set_server_address(host, port.unwrap_or(DEFAULT_PORT));
			json!({ "server": session.endpoint().to_string() })
		}
		ReplCommand::Scenes => {
			let scenes = worker.run(|c| c.load_scenes()).await??;
			json!({ "count": scenes.len(), "scenes": scenes })
		}
		ReplCommand::Select(name) => {
			let scene = worker.console().select_scene_named(&name)?;
			json!({ "selected": scene })
		}
		ReplCommand::Play(Some(name)) => json!({ "response": worker.run(move |c| c.play(&name)).await?? }),
		ReplCommand::Play(None) => json!({ "response": worker.run(|c| c.play_selected()).await?? }),
		ReplCommand::Pause => json!({ "response": worker.run(|c| c.pause()).await?? }),
		ReplCommand::Stop => json!({ "response": worker.run(|c| c.stop()).await?? }),
		ReplCommand::Volume(level) => json!({ "response": worker.run(move |c| c.set_volume(level)).await?? }),
		ReplCommand::Lights(action) => json!({ "response": worker.run(move |c| c.lights(action)).await?? }),
		ReplCommand::EmergencyStop => json!({ "response": worker.run(|c| c.emergency_stop()).await?? }),
		ReplCommand::Reset => json!({ "response": worker.run(|c| c.system_reset()).await?? }),
		ReplCommand::Refresh => Value::Object(worker.run(|c| c.refresh()).await??),
		ReplCommand::Status => {
			let console = worker.console();
			json!({
				"operator": console.operator(),
				"server": worker.endpoint().to_string(),
				"state": worker.state(),
				"selected": console.selected_scene().map(|s| s.name),
				"scenes": console.scenes().len(),
			})
		}
		ReplCommand::Help | ReplCommand::Quit => Value::Null,
	};
	Ok(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_and_comment_lines_are_skipped() {
		assert_eq!(parse_line("   "), Ok(None));
		assert_eq!(parse_line("# cue sheet"), Ok(None));
	}

	#[test]
	fn parses_login() {
		assert_eq!(
			parse_line("login mei s3cret"),
			Ok(Some(ReplCommand::Login {
				user: "mei".into(),
				password: "s3cret".into()
			}))
		);
		assert!(parse_line("login mei").is_err());
	}

	#[test]
	fn scene_names_keep_inner_spaces() {
		assert_eq!(
			parse_line("select   Act 2  Opening "),
			Ok(Some(ReplCommand::Select("Act 2  Opening".into())))
		);
		assert_eq!(parse_line("play"), Ok(Some(ReplCommand::Play(None))));
		assert_eq!(parse_line("play Finale"), Ok(Some(ReplCommand::Play(Some("Finale".into())))));
		assert!(parse_line("select").is_err());
	}

	#[test]
	fn volume_bounds() {
		assert_eq!(parse_line("volume 0"), Ok(Some(ReplCommand::Volume(0))));
		assert_eq!(parse_line("VOLUME 100"), Ok(Some(ReplCommand::Volume(100))));
		assert!(parse_line("volume 101").is_err());
		assert!(parse_line("volume loud").is_err());
	}

	#[test]
	fn lights_and_aliases() {
		assert_eq!(parse_line("lights blue"), Ok(Some(ReplCommand::Lights(LightAction::Blue))));
		assert!(parse_line("lights strobe").is_err());
		assert_eq!(parse_line("estop"), Ok(Some(ReplCommand::EmergencyStop)));
		assert_eq!(parse_line("exit"), Ok(Some(ReplCommand::Quit)));
	}

	#[test]
	fn server_port_is_optional() {
		assert_eq!(
			parse_line("server 10.0.0.9"),
			Ok(Some(ReplCommand::Server {
				host: "10.0.0.9".into(),
				port: None
			}))
		);
		assert_eq!(
			parse_line("server 10.0.0.9 9000"),
			Ok(Some(ReplCommand::Server {
				host: "10.0.0.9".into(),
				port: Some(9000)
			}))
		);
		assert!(parse_line("server 10.0.0.9 99999").is_err());
	}

	#[test]
	fn unknown_verbs_are_rejected() {
		let err = parse_line("fog on").unwrap_err();
		assert!(err.contains("unknown command: fog"));
	}

	#[test]
	fn login_gate_covers_controls_only() {
		assert!(ReplCommand::Pause.requires_login());
		assert!(ReplCommand::Scenes.requires_login());
		assert!(!ReplCommand::Status.requires_login());
		assert!(
			!ReplCommand::Server {
				host: "stage".into(),
				port: None
			}
			.requires_login()
		);
	}
}
