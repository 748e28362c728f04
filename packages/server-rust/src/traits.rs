use std::sync::Arc;

use async_trait::async_trait;
use listings_core::Item;

/// Read access to the catalog served by the query endpoints.
/// Implementations: in-memory snapshot store (hot-reloadable), test doubles.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// The full collection in its stored order.
    async fn list(&self) -> anyhow::Result<Arc<Vec<Item>>>;

    /// Look up a single item by id.
    async fn get(&self, id: &str) -> anyhow::Result<Option<Item>>;

    /// Number of items currently stored.
    async fn len(&self) -> anyhow::Result<usize>;

    /// Whether the store currently holds no items.
    async fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.len().await? == 0)
    }
}
