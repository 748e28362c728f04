//! Listings server entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use listings_server::cli::ServerArgs;
use listings_server::network::NetworkModule;
use listings_server::service::BackgroundWorker;
use listings_server::storage::{
    bundled_catalog, load_catalog_file, modified_time, CatalogReloader, MemoryCatalogStore,
};
use listings_server::telemetry::init_tracing;
use listings_server::traits::CatalogStore;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_format)?;

    let server_config = args.server_config();
    let network_config = args.network_config();

    let (items, loaded_at) = match &server_config.catalog_path {
        Some(path) => {
            let loaded_at = modified_time(path).await;
            (load_catalog_file(path).await?, loaded_at)
        }
        None => (bundled_catalog()?, None),
    };
    info!(items = items.len(), node_id = %server_config.node_id, "catalog loaded");
    let store = Arc::new(MemoryCatalogStore::new(items));

    let mut reloader = match &server_config.catalog_path {
        Some(path) if server_config.reload_interval_ms > 0 => {
            info!(path = %path.display(), interval_ms = server_config.reload_interval_ms, "catalog hot reload enabled");
            Some(BackgroundWorker::start(
                CatalogReloader::new(path.clone(), Arc::clone(&store), loaded_at),
                Duration::from_millis(server_config.reload_interval_ms),
            ))
        }
        _ => None,
    };

    let dyn_store: Arc<dyn CatalogStore> = store;
    let mut module = NetworkModule::new(network_config, server_config, dyn_store);
    let port = module.start().await?;
    info!(port, "listings server listening");

    let result = module.serve(shutdown_signal()).await;

    if let Some(worker) = reloader.as_mut() {
        worker.stop().await;
    }
    if let Err(err) = &result {
        error!(error = %err, "server exited with error");
    }
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
