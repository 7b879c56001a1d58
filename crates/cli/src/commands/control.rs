//! One-shot commands: one session operation, one envelope.

use std::time::Instant;

use serde_json::{Value, json};
use showctl::{ConsoleError, Credentials};
use showctl_protocol::Command;

use crate::cli::{Commands, SendArgs};
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat, ResultBuilder};
use crate::worker::SessionWorker;

pub async fn execute(worker: &SessionWorker, command: Commands, format: OutputFormat) -> Result<()> {
	let started = Instant::now();
	let name = command.name();

	let data = match command {
		Commands::Ping => {
			worker.run(|c| c.session().try_test_connection()).await??;
			json!({ "reachable": true })
		}
		Commands::Login(args) => {
			let credentials = Credentials::new(args.user, args.password);
			let (operator, status) = worker
				.run(move |c| -> std::result::Result<_, ConsoleError> {
					let operator = c.login(credentials)?;
					Ok((operator, c.refresh()?))
				})
				.await??;
			json!({ "operator": operator, "status": status })
		}
		Commands::Scenes => {
			let scenes = worker.run(|c| c.load_scenes()).await??;
			json!({ "count": scenes.len(), "scenes": scenes })
		}
		Commands::Status => Value::Object(worker.run(|c| c.refresh()).await??),
		Commands::Play { scene } => response(worker.run(move |c| c.play(&scene)).await??),
		Commands::Pause => response(worker.run(|c| c.pause()).await??),
		Commands::Stop => response(worker.run(|c| c.stop()).await??),
		Commands::Volume { level } => response(worker.run(move |c| c.set_volume(level)).await??),
		Commands::Lights { action } => response(worker.run(move |c| c.lights(action)).await??),
		Commands::EmergencyStop => response(worker.run(|c| c.emergency_stop()).await??),
		Commands::Reset => response(worker.run(|c| c.system_reset()).await??),
		Commands::Send(args) => {
			let command = build_command(args)?;
			response(worker.run(move |c| c.send(command)).await??)
		}
		Commands::Watch(_) | Commands::Console | Commands::Config(_) => {
			return Err(CliError::InvalidInput(format!("{name} is not a one-shot command")));
		}
	};

	let result = ResultBuilder::new(name)
		.started_at(started)
		.endpoint(&worker.endpoint())
		.state(worker.state())
		.data(data)
		.build();
	output::print_result(&result, format);
	Ok(())
}

fn response(body: Value) -> Value {
	json!({ "response": body })
}

/// Builds the command for `send`, parsing `--data` as JSON.
pub(crate) fn build_command(args: SendArgs) -> Result<Command> {
	if args.name.trim().is_empty() {
		return Err(CliError::InvalidInput("command name must not be empty".into()));
	}
	match args.data {
		None => Ok(Command::new(args.name)),
		Some(raw) => {
			let payload: Value = serde_json::from_str(&raw)
				.map_err(|e| CliError::InvalidInput(format!("--data is not valid JSON: {e}")))?;
			Ok(Command::from_value(args.name, payload))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn send_args(name: &str, data: Option<&str>) -> SendArgs {
		SendArgs {
			name: name.to_string(),
			data: data.map(str::to_string),
		}
	}

	#[test]
	fn send_without_data_has_empty_payload() {
		let command = build_command(send_args("system_reset", None)).unwrap();
		assert_eq!(command.to_body(), json!({"command": "system_reset", "data": {}}));
	}

	#[test]
	fn send_object_data_is_used_as_payload() {
		let command = build_command(send_args("fog", Some(r#"{"level": 3}"#))).unwrap();
		assert_eq!(command.to_body(), json!({"command": "fog", "data": {"level": 3}}));
	}

	#[test]
	fn send_scalar_data_is_wrapped() {
		let command = build_command(send_args("fog", Some("3"))).unwrap();
		assert_eq!(command.to_body(), json!({"command": "fog", "data": {"value": 3}}));
	}

	#[test]
	fn send_rejects_bad_input() {
		assert!(matches!(build_command(send_args("fog", Some("{level"))), Err(CliError::InvalidInput(_))));
		assert!(matches!(build_command(send_args("  ", None)), Err(CliError::InvalidInput(_))));
	}
}
