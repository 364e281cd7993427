//! kshelf registry server

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kshelf_registry::{RegistryService, ServerConfig, StoreBackend, router};
use miette::{IntoDiagnostic, Result};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kshelf-server")]
#[command(version)]
#[command(about = "Registry server for Kubernetes manifest packages", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "KSHELF_SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "KSHELF_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "KSHELF_SERVER_PORT")]
    port: Option<u16>,

    /// Package store backend
    #[arg(long, value_enum, env = "KSHELF_STORE")]
    store: Option<StoreBackend>,

    /// Directory for the file and sqlite stores
    #[arg(long, env = "KSHELF_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load_from(path).into_diagnostic()?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_panic_hook();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config()?;

    let store = config.open_store().into_diagnostic()?;
    let service = Arc::new(RegistryService::new(store));

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .into_diagnostic()?;
    tracing::info!(
        addr = %config.bind_addr(),
        store = ?config.store,
        data_dir = %config.data_dir.display(),
        "Registry listening"
    );

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    tracing::info!("Registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
