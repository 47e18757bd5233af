use bookcat_cli::{config::CliConfig, run::run};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = CliConfig::parse();

    run(config).await
}
