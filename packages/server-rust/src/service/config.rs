use std::path::PathBuf;

/// Server-level configuration for the operation pipeline and catalog storage.
///
/// Controls operation timeouts, concurrency limits, and catalog reloading.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Identifier for this server node, reported by the health endpoint.
    pub node_id: String,
    /// Default timeout for operations in milliseconds.
    pub default_operation_timeout_ms: u64,
    /// Maximum number of concurrent operations before load shedding.
    pub max_concurrent_operations: u32,
    /// Catalog seed file. `None` serves the bundled catalog.
    pub catalog_path: Option<PathBuf>,
    /// Interval between catalog file checks in milliseconds. 0 disables
    /// hot reload.
    pub reload_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            node_id: String::new(),
            default_operation_timeout_ms: 30_000,
            max_concurrent_operations: 1000,
            catalog_path: None,
            reload_interval_ms: 5_000,
        }
    }
}
