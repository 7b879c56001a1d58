use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::cli::WatchArgs;
use crate::error::Result;
use crate::output::{self, ConnectivityEvent, OutputFormat};
use crate::worker::SessionWorker;

/// Probes on a fixed interval and prints every notification the session
/// delivers, until `--count` probes ran or the user interrupts.
pub async fn execute(worker: &mut SessionWorker, args: WatchArgs, format: OutputFormat) -> Result<()> {
	let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	let mut probes = 0u64;
	let mut seq = 0u64;
	info!(endpoint = %worker.endpoint(), interval = args.interval, "watching");

	loop {
		tokio::select! {
			_ = ticker.tick() => {
				worker.run(|c| c.session().test_connection()).await?;
				probes += 1;

				let endpoint = worker.endpoint();
				for state in worker.drain_events() {
					seq += 1;
					output::print_event(&ConnectivityEvent::new(state, &endpoint, seq), format);
				}

				if args.count.is_some_and(|n| probes >= n) {
					break;
				}
			}
			_ = &mut ctrl_c => {
				info!(probes, "interrupted");
				break;
			}
		}
	}
	Ok(())
}
