use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::assembly;
use control_server::{api, setup_app_state};
use infrastructure::config::{self, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server config file
    #[arg(long)]
    config: Option<String>,

    /// Listen host override
    #[arg(long)]
    listen_host: Option<String>,

    /// Listen port override
    #[arg(long)]
    listen_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,control_server=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("unable to load server config: {e}"))?;
    if let Some(host) = args.listen_host {
        server_config.listen_host = host;
    }
    if let Some(port) = args.listen_port {
        server_config.listen_port = port;
    }

    info!("----- Starting up -----");

    let device_configs = config::load_device_configs(Path::new(&server_config.devices_dir))?;
    let activity_configs = config::load_activity_configs(Path::new(&server_config.activities_dir))?;

    let registry = Arc::new(assembly::build_registry(&device_configs, &activity_configs).await);
    info!(
        devices = registry.device_names().len(),
        activities = registry.activity_names().len(),
        "Registry loaded"
    );

    let app = api::create_router(setup_app_state(registry));

    let addr = format!(
        "{}:{}",
        server_config.listen_host, server_config.listen_port
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("----- Shut down -----");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("unable to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("unable to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Received shutdown signal");
}
