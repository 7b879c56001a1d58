mod control;
mod settings;
mod watch;

use crate::cli::{Cli, Commands};
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::output::OutputFormat;
use crate::repl;
use crate::worker::SessionWorker;

pub async fn dispatch(cli: Cli, format: OutputFormat) -> Result<()> {
	let Cli {
		config: config_path,
		host,
		port,
		command,
		..
	} = cli;
	let path = ConsoleConfig::resolve_path(config_path.as_deref())?;

	// Config subcommands never open a session
	if let Commands::Config(args) = command {
		return settings::execute(args.action, &path, host, port, format);
	}

	let mut config = ConsoleConfig::load(&path)?;
	config.apply_overrides(host, port);

	let mut worker = SessionWorker::start(config.session_config()).await?;
	let result = match command {
		Commands::Console => repl::run(&mut worker, format).await,
		Commands::Watch(args) => watch::execute(&mut worker, args, format).await,
		command => control::execute(&worker, command, format).await,
	};
	worker.shutdown().await;

	result
}
