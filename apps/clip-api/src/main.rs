use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = clip_api::Args::parse();

	clip_api::run(args).await
}
