//! kapowd: Kapow recommendation daemon.
//!
//! Serves the [`KapowService`](kapow::KapowService) over HTTP so a CMS
//! front end can query recommendations and report feedback.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kapow::server::config::{Config, Secrets};
use kapow::server::{app_state, build_service, create_router};

/// Kapow daemon: image recommendations for post text.
#[derive(Parser)]
#[command(name = "kapowd")]
#[command(version = kapow::PKG_VERSION)]
#[command(about = "Kapow image recommendation daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kapow=info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let service = Arc::new(build_service(&config, &secrets)?);

    // Parse address
    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| kapow::KapowError::Configuration(format!("Invalid address: {e}")))?;

    info!(version = kapow::version_string(), %addr, "kapowd starting");

    let router = create_router(app_state(service, &config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("kapowd shutting down");
        })
        .await?;

    Ok(())
}
