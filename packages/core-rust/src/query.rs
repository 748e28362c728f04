//! Query descriptor: the single immutable value describing one catalog query.
//!
//! Callers never mutate a descriptor in place. Each UI interaction produces a
//! new descriptor through the `with_*` transitions, which reset the page the
//! same way a browsing screen does when the result set changes shape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Page size used when a caller does not choose one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Wire value of the "every category" sentinel.
pub const ALL_CATEGORIES: &str = "all";

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Sort order applied to the filtered collection.
///
/// Name ordering compares names case-insensitively (Unicode lowercase) and
/// falls back to a byte-wise comparison of the original names, so the order
/// is total and independent of locale. Price ordering uses `f64::total_cmp`.
/// Every key sorts stably: equal keys keep collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
}

impl SortKey {
    /// All keys in display order.
    pub const ALL: [SortKey; 4] = [
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
    ];

    /// Wire value (`"name-asc"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
        }
    }

    /// Human-readable label for a sort picker.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortKey::NameAsc => "Name (A to Z)",
            SortKey::NameDesc => "Name (Z to A)",
            SortKey::PriceAsc => "Price (Low to High)",
            SortKey::PriceDesc => "Price (High to Low)",
        }
    }

    /// Parses a request parameter, falling back to [`SortKey::NameAsc`] for
    /// missing or unknown values. Never fails.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the strict [`FromStr`] impl of [`SortKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CategoryFilter
// ---------------------------------------------------------------------------

/// Category restriction: the `all` sentinel or one exact, case-sensitive value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

impl CategoryFilter {
    /// Parses a request parameter. Missing, empty, and `"all"` all select
    /// every category; anything else is an exact match.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            None | Some("" | ALL_CATEGORIES) => CategoryFilter::All,
            Some(value) => CategoryFilter::Exact(value.to_string()),
        }
    }

    /// Wire value of this filter.
    #[must_use]
    pub fn as_param(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Exact(value) => value,
        }
    }

    /// Whether an item in `category` passes this filter.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exact(value) => value == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        CategoryFilter::from_param(Some(value))
    }
}

// ---------------------------------------------------------------------------
// QueryDescriptor
// ---------------------------------------------------------------------------

/// All parameters of one catalog query.
///
/// `page` and `page_size` hold what the caller asked for, including
/// nonsensical values such as `0` or `-3`; the evaluator clamps them when it
/// serves the query. Two equal descriptors always evaluate to equal results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    pub search_text: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
    pub page: i64,
    pub page_size: i64,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            category: CategoryFilter::All,
            sort: SortKey::NameAsc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryDescriptor {
    /// New search text; results start over at page 1.
    #[must_use]
    pub fn with_search_text(self, search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            page: 1,
            ..self
        }
    }

    /// New category filter; results start over at page 1.
    #[must_use]
    pub fn with_category(self, category: impl Into<CategoryFilter>) -> Self {
        Self {
            category: category.into(),
            page: 1,
            ..self
        }
    }

    /// New sort order; results start over at page 1.
    #[must_use]
    pub fn with_sort(self, sort: SortKey) -> Self {
        Self {
            sort,
            page: 1,
            ..self
        }
    }

    /// Same query, different page.
    #[must_use]
    pub fn with_page(self, page: i64) -> Self {
        Self { page, ..self }
    }

    /// Same query, different page size; results start over at page 1.
    #[must_use]
    pub fn with_page_size(self, page_size: i64) -> Self {
        Self {
            page_size,
            page: 1,
            ..self
        }
    }

    /// Drops search text, category and sort, keeping the page size.
    #[must_use]
    pub fn cleared(self) -> Self {
        Self {
            page_size: self.page_size,
            ..Self::default()
        }
    }

    /// Page size with values below 1 treated as 1.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        usize::try_from(self.page_size.max(1)).unwrap_or(usize::MAX)
    }

    /// Requested page with values below 1 treated as 1. Not yet clamped to
    /// the last page, which depends on the collection.
    #[must_use]
    pub fn requested_page(&self) -> usize {
        usize::try_from(self.page.max(1)).unwrap_or(usize::MAX)
    }
}
