pub mod server;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Result, eyre};

#[derive(Debug, Parser)]
#[command(
	version = clip_cli::VERSION,
	rename_all = "kebab",
	styles = clip_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
	let config = clip_config::load(&args.config)?;
	let mcp = config
		.mcp
		.as_ref()
		.ok_or_else(|| eyre::eyre!("mcp section is required for clip-mcp."))?;

	server::serve_mcp(mcp).await
}
