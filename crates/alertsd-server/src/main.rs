mod clock;
mod config;
mod error;
mod supervisor;
mod workers;

use clap::Parser;
use config::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = supervisor::run(cli).await {
        tracing::error!(%err, "alertsd exited with a fatal error");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.env_filter_directive()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
