//! Catalog storage for the listings server.
//!
//! - [`memory`]: lock-free snapshot store implementing [`CatalogStore`](crate::traits::CatalogStore)
//! - [`loader`]: reading and validating catalog seed documents
//! - [`reload`]: background hot reload of a seed file into a store

pub mod loader;
pub mod memory;
pub mod reload;

pub use loader::{bundled_catalog, load_catalog_file, parse_catalog};
pub use memory::MemoryCatalogStore;
pub use reload::{modified_time, CatalogReloader, ReloadTask};
