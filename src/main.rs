use clap::Parser;
use printhmi::{init_logging, Cli, BUILD_DATE, VERSION};
use printhmi_settings::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;
    tracing::info!("printhmi {} (built {})", VERSION, BUILD_DATE);

    let config = Config::load(cli.config.as_deref())?;
    printhmi::run(config).await
}
