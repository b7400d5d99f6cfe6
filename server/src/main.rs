use anyhow::Context;
use bookswap_auth::Authenticator;
use bookswap_backend_api::{build_router, AppState};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "bookswap-server", about = "Bookswap backend server")]
struct Cli {
    /// Path to a configuration file; overrides the default search locations
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = cli.config {
        std::env::set_var("BOOKSWAP_CONFIG", path);
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("starting Bookswap backend");

    let config = bookswap_config::load().context("failed to load configuration")?;

    let db_pool = bookswap_database::initialize_database(&config.database)
        .await
        .context("failed to initialize database")?;

    let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
    info!("authentication subsystem ready");

    let app = build_router(AppState::new(db_pool, authenticator));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(?err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
