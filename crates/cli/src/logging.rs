use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init_logging(verbosity: u8) {
	// 0 = errors only (subscriber failures still surface)
	// 1 (-v) = info: logins, connectivity changes, failed operations
	// 2+ (-vv) = debug for showctl, including every request outcome
	let filter = match verbosity {
		0 => "error",
		1 => "warn,showctl=info,showctl_cli=info",
		_ => "info,showctl=debug,showctl_runtime=debug,showctl_cli=debug",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
