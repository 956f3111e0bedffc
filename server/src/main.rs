use std::process::ExitCode;

use clap::Parser;
use tracing::Instrument;

use rules_objstore::config::{Config, init_logging};
use rules_objstore::prelude::*;

async fn run(config: Config) -> ClResult<()> {
	config.app_builder().await?.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
	let config = Config::parse();
	if let Err(err) = init_logging(&config) {
		eprintln!("{}", err);
		return ExitCode::FAILURE;
	}

	let span = info_span!("rules-objstore", name = %config.debug_name);
	match run(config).instrument(span).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("FATAL: {}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
