use bookcat_server::{
    config::{Parser as _, ServerConfig},
    run, Result,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = ServerConfig::parse();
    run(args).await
}
