//! Medhist console binary.

use clap::Parser;
use medhist::{App, Cli, run};
use medhist_infrastructure::ClientConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    let app = App::from_config(&config, cli.ephemeral)?;
    let output = run(&app, cli.command).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
