//! Catalog query request parameters and response bodies.
//!
//! Response structs use `#[serde(rename_all = "camelCase")]` so the same
//! types produce the JSON body and the named-field `MsgPack` body.

use serde::{Deserialize, Serialize};

use crate::query::{CategoryFilter, QueryDescriptor, SortKey, DEFAULT_PAGE_SIZE};
use crate::result::QueryResult;
use crate::types::Item;

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Query-string parameters of a list request.
///
/// Every field is an optional raw string so that malformed values reach
/// [`ListItemsParams::to_descriptor`] and get normalized there instead of
/// being rejected by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListItemsParams {
    /// Case-insensitive substring of the item name. Default empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub query: Option<String>,
    /// Exact category or `"all"`. Default `"all"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
    /// One of the four sort keys. Default `"name-asc"`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sort: Option<String>,
    /// 1-based page. Default 1.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page: Option<String>,
    /// Page size. Default 10.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub limit: Option<String>,
}

impl ListItemsParams {
    /// Builds the descriptor these parameters ask for.
    ///
    /// Unparsable numbers fall back to their defaults; values below 1 are
    /// kept as requested and clamped by the evaluator.
    #[must_use]
    pub fn to_descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            search_text: self.query.clone().unwrap_or_default(),
            category: CategoryFilter::from_param(self.category.as_deref()),
            sort: SortKey::from_param(self.sort.as_deref()),
            page: parse_number(self.page.as_deref(), 1),
            page_size: parse_number(self.limit.as_deref(), DEFAULT_PAGE_SIZE),
        }
    }
}

impl From<&QueryDescriptor> for ListItemsParams {
    fn from(query: &QueryDescriptor) -> Self {
        Self {
            query: Some(query.search_text.clone()),
            category: Some(query.category.as_param().to_string()),
            sort: Some(query.sort.as_str().to_string()),
            page: Some(query.page.to_string()),
            limit: Some(query.page_size.to_string()),
        }
    }
}

fn parse_number(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Body of a successful list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsResponse {
    pub items: Vec<Item>,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Older servers omit this field; it decodes as empty.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl From<QueryResult> for ListItemsResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            items: result.items,
            page: result.page,
            limit: result.page_size,
            total_pages: result.total_pages,
            total_items: result.total_items,
            categories: result.categories,
        }
    }
}

impl From<ListItemsResponse> for QueryResult {
    fn from(response: ListItemsResponse) -> Self {
        Self {
            items: response.items,
            page: response.page,
            page_size: response.limit,
            total_items: response.total_items,
            total_pages: response.total_pages,
            categories: response.categories,
        }
    }
}

/// Body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
