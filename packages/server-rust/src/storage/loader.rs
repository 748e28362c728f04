//! Catalog seed loading.
//!
//! A catalog file is a JSON array of items in the wire shape
//! (`{id, name, description, price, category, stock, image?}`). Every load
//! is validated before it can reach a store.

use std::path::Path;

use anyhow::Context;
use listings_core::{validate_catalog, Item};

/// Catalog compiled into the binary, served when no file is configured.
const BUNDLED_CATALOG: &str = include_str!("../../data/products.json");

/// Parses and validates a catalog document.
///
/// # Errors
///
/// Returns an error if `bytes` is not a JSON array of items or the items
/// fail validation (empty or duplicate ids, invalid prices).
pub fn parse_catalog(bytes: &[u8]) -> anyhow::Result<Vec<Item>> {
    let items: Vec<Item> = serde_json::from_slice(bytes).context("catalog is not a JSON array of items")?;
    validate_catalog(&items)?;
    Ok(items)
}

/// Reads and validates the catalog file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a valid
/// catalog.
pub async fn load_catalog_file(path: &Path) -> anyhow::Result<Vec<Item>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    parse_catalog(&bytes).with_context(|| format!("invalid catalog {}", path.display()))
}

/// The catalog shipped with the server.
///
/// # Errors
///
/// Returns an error only if the bundled document is malformed.
pub fn bundled_catalog() -> anyhow::Result<Vec<Item>> {
    parse_catalog(BUNDLED_CATALOG.as_bytes()).context("bundled catalog")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bundled_catalog_is_valid() {
        let items = bundled_catalog().unwrap();
        assert!(items.len() > 20);
        assert!(items.iter().any(|i| i.name == "Aurora Desk Lamp"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let doc = br#"[
            {"id":"x","name":"A","description":"","price":1.0,"category":"C","stock":1},
            {"id":"x","name":"B","description":"","price":2.0,"category":"C","stock":1}
        ]"#;
        let err = parse_catalog(doc).unwrap_err();
        assert!(err.to_string().contains('x'), "{err:#}");
    }

    #[test]
    fn rejects_non_array() {
        assert!(parse_catalog(br#"{"items":[]}"#).is_err());
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"id":"k1","name":"Kettle","description":"Steel","price":39.5,"category":"Kitchen","stock":4,"image":"/img/k1.png"}]"#,
        )
        .unwrap();

        let items = load_catalog_file(file.path()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].image.as_deref(), Some("/img/k1.png"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_catalog_file(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));
    }
}
