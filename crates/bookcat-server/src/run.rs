use axum::Router;
use bookcat_app::{
    auth::session_layer,
    state::{AppConfig, AppState},
};
use futures::FutureExt as _;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{config::ServerConfig, error::Result};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let app = main_router(state, &args)?;

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

pub fn main_router(state: AppState, args: &ServerConfig) -> Result<Router<()>> {
    let sessions = session_layer(args.session_expiry()?, args.secure_cookies);
    let router = Router::new()
        .merge(bookcat_app::pages::router())
        .merge(bookcat_app::catalogue::router())
        .merge(bookcat_app::book::router())
        .merge(bookcat_app::auth::router())
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    Ok(router)
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let app_config: AppConfig = config.into();
    let pool = bookcat_dal::new_pool(&config.database_url()).await?;
    bookcat_dal::migrate(&pool).await?;
    debug!("Database ready at {}", config.database_url());
    let state = AppState::new(app_config, pool)?;
    Ok(state)
}
