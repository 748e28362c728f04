//! In-memory [`CatalogStore`] backed by [`ArcSwap`] and [`DashMap`].
//!
//! The ordered collection lives behind an `ArcSwap` so every query evaluates
//! against one consistent snapshot without locking, even while a reload
//! swaps in a new catalog. Point lookups go through a `DashMap` id index.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use listings_core::Item;

use crate::traits::CatalogStore;

/// Hot-swappable in-memory catalog.
pub struct MemoryCatalogStore {
    items: ArcSwap<Vec<Item>>,
    index: DashMap<String, Item>,
}

impl MemoryCatalogStore {
    /// Creates a store holding `items` in the given order.
    ///
    /// Items are expected to be validated already; with duplicate ids the
    /// index keeps the last occurrence.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        let index = DashMap::with_capacity(items.len());
        for item in &items {
            index.insert(item.id.clone(), item.clone());
        }
        Self {
            items: ArcSwap::from_pointee(items),
            index,
        }
    }

    /// Current collection snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Item>> {
        self.items.load_full()
    }

    /// Replaces the whole catalog.
    ///
    /// The collection swap is atomic. The index is updated insert-first, so
    /// an id present in both the old and the new catalog never misses.
    pub fn replace(&self, items: Vec<Item>) {
        let ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
        for item in &items {
            self.index.insert(item.id.clone(), item.clone());
        }
        self.index.retain(|id, _| ids.contains(id.as_str()));
        self.items.store(Arc::new(items));
    }
}

impl Default for MemoryCatalogStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list(&self) -> anyhow::Result<Arc<Vec<Item>>> {
        Ok(self.snapshot())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Item>> {
        Ok(self.index.get(id).map(|entry| entry.value().clone()))
    }

    async fn len(&self) -> anyhow::Result<usize> {
        Ok(self.items.load().len())
    }
}
