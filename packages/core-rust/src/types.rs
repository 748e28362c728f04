use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A catalog entry as served by the backing store.
///
/// Items are immutable from the query engine's point of view: the evaluator
/// clones matching items into a result page but never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique, stable, opaque identifier.
    pub id: String,
    /// Display name. Search text is matched against this field only.
    pub name: String,
    /// Long-form text shown on the detail view.
    pub description: String,
    /// Non-negative unit price. Passed through without currency formatting.
    pub price: f64,
    /// Category label, matched exactly by the category filter.
    pub category: String,
    /// Units in stock.
    pub stock: u32,
    /// Optional image URL, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
}

impl Item {
    /// Whether at least one unit is available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Reasons a collection is rejected as a catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("item at index {index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate item id: {id}")]
    DuplicateId { id: String },
    #[error("item {id} has invalid price {price}")]
    InvalidPrice { id: String, price: f64 },
}

/// Checks the invariants the store promises for every item it serves.
///
/// The evaluator is total and never calls this; it exists for loaders that
/// ingest untrusted seed data.
///
/// # Errors
///
/// Returns the first violation found, in collection order.
pub fn validate_catalog(items: &[Item]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.id.is_empty() {
            return Err(CatalogError::EmptyId { index });
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(CatalogError::InvalidPrice {
                id: item.id.clone(),
                price: item.price,
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(CatalogError::DuplicateId {
                id: item.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {id}"),
            description: String::new(),
            price,
            category: "Misc".to_string(),
            stock: 1,
            image: None,
        }
    }

    #[test]
    fn valid_catalog_passes() {
        assert!(validate_catalog(&[item("a", 1.0), item("b", 0.0)]).is_ok());
        assert!(validate_catalog(&[]).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = validate_catalog(&[item("a", 1.0), item("a", 2.0)]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId { id: "a".into() });
    }

    #[test]
    fn rejects_negative_and_nan_prices() {
        assert!(matches!(
            validate_catalog(&[item("a", -0.5)]),
            Err(CatalogError::InvalidPrice { .. })
        ));
        assert!(matches!(
            validate_catalog(&[item("a", f64::NAN)]),
            Err(CatalogError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn rejects_empty_id() {
        assert_eq!(
            validate_catalog(&[item("a", 1.0), item("", 1.0)]),
            Err(CatalogError::EmptyId { index: 1 })
        );
    }

    #[test]
    fn image_is_omitted_when_absent() {
        let json = serde_json::to_value(item("a", 1.0)).unwrap();
        assert!(json.get("image").is_none());
        assert_eq!(json["price"], 1.0);
    }
}
