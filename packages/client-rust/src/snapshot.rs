//! Observable state published by the controllers.

use listings_core::{Item, PaginationInfo, QueryResult};

/// Where a controller is in its `Idle → Loading → {Ready | Failed}` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Everything a list view renders. Always internally consistent: after a
/// failure the dependent fields are already reset to safe defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub items: Vec<Item>,
    pub pagination: PaginationInfo,
    pub categories: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub phase: LoadPhase,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: PaginationInfo::empty(),
            categories: Vec::new(),
            loading: false,
            error: None,
            phase: LoadPhase::Idle,
        }
    }
}

impl CatalogSnapshot {
    pub(crate) fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
        self.phase = LoadPhase::Loading;
    }

    pub(crate) fn apply_result(&mut self, result: QueryResult) {
        self.pagination = result.pagination();
        self.items = result.items;
        self.categories = result.categories;
        self.loading = false;
        self.error = None;
        self.phase = LoadPhase::Ready;
    }

    pub(crate) fn apply_failure(&mut self, message: &str) {
        self.items.clear();
        self.pagination = PaginationInfo::empty();
        self.categories.clear();
        self.loading = false;
        self.error = Some(message.to_string());
        self.phase = LoadPhase::Failed;
    }

    /// True when the last load succeeded with nothing to show.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        self.phase == LoadPhase::Ready && self.items.is_empty()
    }

    /// Status line for the result list, e.g. `"Found 25 products • Showing 11-20"`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.loading {
            return "Just a moment, loading products...".to_string();
        }
        match (self.pagination.total_items, self.pagination.showing_range()) {
            (0, _) | (_, None) => "We couldn't find any products".to_string(),
            (1, _) => "Found 1 product".to_string(),
            (total, Some((start, end))) => {
                format!("Found {total} products • Showing {start}-{end}")
            }
        }
    }
}

/// Why an item could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemLoadError {
    #[error("Missing product id")]
    MissingId,
    #[error("Product not found")]
    NotFound { id: String },
    #[error("{0}")]
    Unavailable(String),
}

/// Everything a detail view renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemSnapshot {
    pub item: Option<Item>,
    pub loading: bool,
    pub error: Option<ItemLoadError>,
    pub phase: LoadPhase,
}

impl ItemSnapshot {
    /// Stock line for the detail view.
    #[must_use]
    pub fn stock_label(&self) -> Option<String> {
        self.item.as_ref().map(|item| {
            if item.in_stock() {
                format!("In Stock • {} available", item.stock)
            } else {
                "Currently Out of Stock".to_string()
            }
        })
    }
}
