//! Hot reload of the catalog seed file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::loader::load_catalog_file;
use super::memory::MemoryCatalogStore;
use crate::service::worker::BackgroundRunnable;

/// Work the reloader accepts besides its periodic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTask {
    /// Re-read the file regardless of its modification time.
    Now,
}

/// Watches one catalog file and swaps its contents into a store.
///
/// On every tick the file's modification time is compared with the last one
/// loaded; a change triggers a reload. A reload that fails keeps the
/// catalog currently being served.
pub struct CatalogReloader {
    path: PathBuf,
    store: Arc<MemoryCatalogStore>,
    last_modified: Option<SystemTime>,
    reloads: u64,
}

impl CatalogReloader {
    /// `loaded_at` is the modification time of the copy already in `store`,
    /// if known; without it the first tick reloads.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        store: Arc<MemoryCatalogStore>,
        loaded_at: Option<SystemTime>,
    ) -> Self {
        Self {
            path: path.into(),
            store,
            last_modified: loaded_at,
            reloads: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Successful reloads so far.
    #[must_use]
    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    async fn reload(&mut self, modified: Option<SystemTime>) {
        match load_catalog_file(&self.path).await {
            Ok(items) => {
                let count = items.len();
                self.store.replace(items);
                self.last_modified = modified;
                self.reloads += 1;
                info!(path = %self.path.display(), items = count, "catalog reloaded");
            }
            Err(err) => {
                // Remember the attempt so a broken file is not re-read every tick.
                self.last_modified = modified;
                let error = format!("{err:#}");
                warn!(path = %self.path.display(), %error, "catalog reload failed; keeping previous catalog");
            }
        }
    }
}

/// Modification time of `path`, if it can be read.
pub async fn modified_time(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

#[async_trait]
impl BackgroundRunnable for CatalogReloader {
    type Task = ReloadTask;

    async fn run(&mut self, task: ReloadTask) {
        match task {
            ReloadTask::Now => {
                let modified = modified_time(&self.path).await;
                self.reload(modified).await;
            }
        }
    }

    async fn on_tick(&mut self) {
        let modified = modified_time(&self.path).await;
        if modified.is_none() || modified == self.last_modified {
            debug!(path = %self.path.display(), "catalog unchanged");
            return;
        }
        self.reload(modified).await;
    }
}
