use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_PAGE_SIZE;
use crate::types::Item;

/// One served page of a catalog query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Items on the effective page, at most `page_size` of them.
    pub items: Vec<Item>,
    /// The page actually served, after clamping into `1..=total_pages`.
    pub page: usize,
    /// Page size the result was cut with (at least 1).
    pub page_size: usize,
    /// Number of items matching the filter, before pagination.
    pub total_items: usize,
    /// `max(1, ceil(total_items / page_size))`.
    pub total_pages: usize,
    /// Distinct categories of the whole, unfiltered collection, sorted.
    pub categories: Vec<String>,
}

impl QueryResult {
    /// Pagination view of this result.
    #[must_use]
    pub fn pagination(&self) -> PaginationInfo {
        PaginationInfo {
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            limit: self.page_size,
        }
    }
}

/// Position of a page within a result set, as a pager needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub limit: usize,
}

impl PaginationInfo {
    /// Neutral pagination shown before the first result or after a failure.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            total_items: 0,
            // DEFAULT_PAGE_SIZE is a small positive constant.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            limit: DEFAULT_PAGE_SIZE as usize,
        }
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Clamps a requested page into `1..=total_pages`.
    #[must_use]
    pub fn clamp_page(&self, requested: i64) -> usize {
        let last = self.total_pages.max(1);
        usize::try_from(requested.max(1)).map_or(last, |page| page.min(last))
    }

    /// 1-based inclusive range of the items shown on this page, or `None`
    /// when there is nothing to show.
    #[must_use]
    pub fn showing_range(&self) -> Option<(usize, usize)> {
        if self.total_items == 0 {
            return None;
        }
        let start = (self.page.saturating_sub(1)) * self.limit + 1;
        let end = self.total_items.min(self.page * self.limit);
        (start <= end).then_some((start, end))
    }
}

impl Default for PaginationInfo {
    fn default() -> Self {
        Self::empty()
    }
}
