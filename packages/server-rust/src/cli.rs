//! Command-line arguments of the server binary.
//!
//! Every flag can also be set through a `LISTINGS_*` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::network::{NetworkConfig, TlsConfig};
use crate::service::ServerConfig;
use crate::telemetry::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "listings-server", version, about = "Serves a product catalog over HTTP")]
pub struct ServerArgs {
    /// Address to bind.
    #[arg(long, env = "LISTINGS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on; 0 picks a free port.
    #[arg(long, env = "LISTINGS_PORT", default_value_t = 8080)]
    pub port: u16,

    /// JSON catalog file. Without it the bundled catalog is served.
    #[arg(long, env = "LISTINGS_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// How often to check the catalog file for changes, in milliseconds.
    /// 0 disables hot reload.
    #[arg(long, env = "LISTINGS_RELOAD_INTERVAL_MS", default_value_t = 5_000)]
    pub reload_interval_ms: u64,

    /// Budget for one catalog operation, in milliseconds.
    #[arg(long, env = "LISTINGS_OPERATION_TIMEOUT_MS", default_value_t = 30_000)]
    pub operation_timeout_ms: u64,

    /// Concurrent operations allowed before requests are shed with 503.
    #[arg(long, env = "LISTINGS_MAX_CONCURRENT_OPERATIONS", default_value_t = 1000)]
    pub max_concurrent_operations: u32,

    /// HTTP request timeout, in seconds.
    #[arg(long, env = "LISTINGS_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins, comma separated.
    #[arg(
        long,
        env = "LISTINGS_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// PEM certificate chain; enables TLS together with `--tls-key`.
    #[arg(long, env = "LISTINGS_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key for `--tls-cert`.
    #[arg(long, env = "LISTINGS_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Node identifier reported by `/health`.
    #[arg(long, env = "LISTINGS_NODE_ID", default_value = "listings-1")]
    pub node_id: String,

    /// Log output format.
    #[arg(long, env = "LISTINGS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => None,
        };
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..NetworkConfig::default()
        }
    }

    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            node_id: self.node_id.clone(),
            default_operation_timeout_ms: self.operation_timeout_ms,
            max_concurrent_operations: self.max_concurrent_operations,
            catalog_path: self.catalog.clone(),
            reload_interval_ms: self.reload_interval_ms,
        }
    }
}
