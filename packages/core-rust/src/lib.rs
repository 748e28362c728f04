//! Listings core: catalog data model, query evaluator and wire messages.

pub mod evaluator;
pub mod messages;
pub mod query;
pub mod result;
pub mod types;

pub use evaluator::{distinct_categories, evaluate, total_pages};
pub use query::{CategoryFilter, QueryDescriptor, SortKey, ALL_CATEGORIES, DEFAULT_PAGE_SIZE};
pub use result::{PaginationInfo, QueryResult};
pub use types::{validate_catalog, CatalogError, Item};
