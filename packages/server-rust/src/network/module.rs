//! Network module with deferred startup lifecycle.
//!
//! `new()` assembles shared state (store, operation pipeline, drain
//! state), `start()` binds the TCP listener, and `serve()` accepts
//! connections until the shutdown future resolves. Binding separately from
//! serving lets callers learn the OS-assigned port before traffic arrives.

use std::future::Future;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{
    get_product_handler, health_handler, list_products_handler, liveness_handler,
    readiness_handler, AppState,
};
use super::drain::DrainState;
use super::middleware::apply_http_layers;
use crate::service::{build_operation_pipeline, CatalogService, OperationPipeline, ServerConfig};
use crate::traits::CatalogStore;

/// Manages the HTTP server lifecycle for the catalog API.
pub struct NetworkModule {
    config: NetworkConfig,
    server_config: Arc<ServerConfig>,
    store: Arc<dyn CatalogStore>,
    pipeline: OperationPipeline,
    listener: Option<TcpListener>,
    drain: Arc<DrainState>,
    start_time: Instant,
}

impl NetworkModule {
    /// Creates the module and its operation pipeline without binding a port.
    #[must_use]
    pub fn new(
        config: NetworkConfig,
        server_config: ServerConfig,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        let pipeline =
            build_operation_pipeline(CatalogService::new(Arc::clone(&store)), &server_config);
        Self {
            config,
            server_config: Arc::new(server_config),
            store,
            pipeline,
            listener: None,
            drain: Arc::new(DrainState::new()),
            start_time: Instant::now(),
        }
    }

    /// Health and in-flight tracking shared with the handlers.
    #[must_use]
    pub fn drain_state(&self) -> Arc<DrainState> {
        Arc::clone(&self.drain)
    }

    fn app_state(&self) -> AppState {
        AppState {
            drain: Arc::clone(&self.drain),
            pipeline: self.pipeline.clone(),
            store: Arc::clone(&self.store),
            server_config: Arc::clone(&self.server_config),
            call_ids: Arc::new(AtomicU64::new(0)),
            start_time: self.start_time,
        }
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /products` -- one page of query results
    /// - `GET /products/{id}` -- a single item
    /// - `GET /health` -- detailed health JSON
    /// - `GET /health/live` -- liveness check
    /// - `GET /health/ready` -- readiness check
    pub fn build_router(&self) -> Router {
        let routes = Router::new()
            .route("/products", get(list_products_handler))
            .route("/products/{id}", get(get_product_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler));
        apply_http_layers(routes, &self.config).with_state(self.app_state())
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 asks for an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// When the signal fires, health moves to `Draining` (readiness turns
    /// 503), the server stops accepting connections, and in-flight requests
    /// get up to `drain_timeout` to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a fatal I/O error or the
    /// TLS material cannot be loaded.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let drain = self.drain;
        let config = self.config;

        let signal = {
            let drain = Arc::clone(&drain);
            async move {
                shutdown.await;
                info!("shutdown signal received; draining");
                drain.begin_drain();
            }
        };

        drain.mark_ready();

        if let Some(tls_config) = &config.tls {
            serve_tls(listener, router, tls_config, signal).await?;
        } else {
            info!("serving plain HTTP");
            axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await?;
        }

        if drain.drain(config.drain_timeout).await {
            info!("all catalog requests drained");
        } else {
            warn!(
                in_flight = drain.in_flight(),
                "drain timeout expired with catalog requests still running"
            );
        }
        Ok(())
    }
}

/// Serves TLS connections using `axum-server` with rustls, reusing the
/// pre-bound listener.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls_config: &TlsConfig,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls_config.cert_path, &tls_config.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        signal.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!(%addr, "serving TLS");

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}
