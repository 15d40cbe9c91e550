//! Catalog source collaborator.
//!
//! The core makes no retry/backoff decisions about fetching the catalog; a
//! source either hands back a full snapshot or an error the caller decides
//! what to do with.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::Product;

use crate::snapshot::CatalogSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Supplies the immutable product snapshot used by the query engine.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_all(&self) -> Result<CatalogSnapshot, CatalogError>;
}

#[async_trait]
impl<S> CatalogSource for Arc<S>
where
    S: CatalogSource + ?Sized,
{
    async fn fetch_all(&self) -> Result<CatalogSnapshot, CatalogError> {
        (**self).fetch_all().await
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    snapshot: CatalogSnapshot,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            snapshot: CatalogSnapshot::new(products),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_all(&self) -> Result<CatalogSnapshot, CatalogError> {
        Ok(self.snapshot.clone())
    }
}

/// Catalog read from a JSON file holding an array of products.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn fetch_all(&self) -> Result<CatalogSnapshot, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Io(format!("{}: {e}", self.path.display())))?;

        let products = parse_products(&raw)?;
        tracing::info!(
            path = %self.path.display(),
            products = products.len(),
            "loaded catalog from file"
        );
        Ok(CatalogSnapshot::new(products))
    }
}

/// Decode a catalog payload (JSON array of products).
pub(crate) fn parse_products(raw: &str) -> Result<Vec<Product>, CatalogError> {
    serde_json::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use storefront_core::{Price, ProductId};

    #[tokio::test]
    async fn static_catalog_returns_its_products() {
        let source = StaticCatalog::new(vec![Product::new(
            ProductId::new(1),
            "Shirt",
            "",
            Price::new(10.0).unwrap(),
        )]);

        let snapshot = source.fetch_all().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn json_file_catalog_reads_product_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "title": "Shirt", "description": "", "price": 19.5}},
                {{"id": 2, "title": "Pants", "description": "", "price": 40}}]"#
        )
        .unwrap();

        let source = JsonFileCatalog::new(file.path());
        let snapshot = source.fetch_all().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(ProductId::new(1)).unwrap().price.value(), 19.5);
    }

    #[tokio::test]
    async fn json_file_catalog_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = JsonFileCatalog::new(file.path()).fetch_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileCatalog::new(dir.path().join("missing.json"));

        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
