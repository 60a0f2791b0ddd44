use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = clip_mcp::Args::parse();

	clip_mcp::run(args).await
}
