//! Application state shared with every UI caller.

use std::sync::Arc;

use storefront_cart::{CartStore, CartStoreConfig, HydrationOutcome, KeyValueStorage, SqliteStorage};
use storefront_catalog::{CatalogSnapshot, CatalogSource, JsonFileCatalog, StaticCatalog};

use crate::config::{AppConfig, CatalogLocation};

/// One instance per session, built by the composition root and cloned into
/// each screen.
#[derive(Debug, Clone)]
pub struct AppState {
    pub cart: CartStore,
    pub catalog: CatalogSnapshot,
}

impl AppState {
    /// Wire storage and catalog from configuration.
    pub async fn bootstrap(config: &AppConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match config.storage_path() {
            Some(path) => Arc::new(SqliteStorage::with_path(path)),
            None => Arc::new(SqliteStorage::new()),
        };

        let source = catalog_source(&config.catalog)?;
        Self::assemble(storage, source.as_ref(), config.cart_store_config()).await
    }

    /// Build the state from explicit collaborators.
    ///
    /// The cart is hydrated here, before the state is handed to any caller,
    /// so no user mutation can race the startup load.
    pub async fn assemble(
        storage: Arc<dyn KeyValueStorage>,
        source: &dyn CatalogSource,
        cart_config: CartStoreConfig,
    ) -> anyhow::Result<Self> {
        let cart = CartStore::new(storage, cart_config)?;

        match cart.load_cart().await {
            HydrationOutcome::Restored { lines } => {
                tracing::info!(lines, items = cart.total_cart_items(), "cart ready");
            }
            outcome => tracing::info!(?outcome, "cart ready (empty)"),
        }

        // The session continues without products if the catalog is unreachable.
        let catalog = match source.fetch_all().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!("failed to load catalog: {err}");
                CatalogSnapshot::default()
            }
        };

        Ok(Self { cart, catalog })
    }

    /// Flush pending cart writes and stop background work.
    pub async fn shutdown(&self) {
        self.cart.shutdown().await;
    }
}

fn catalog_source(location: &CatalogLocation) -> anyhow::Result<Box<dyn CatalogSource>> {
    let source: Box<dyn CatalogSource> = match location {
        CatalogLocation::File(path) => Box::new(JsonFileCatalog::new(path.clone())),
        #[cfg(feature = "http")]
        CatalogLocation::Http(url) => {
            Box::new(storefront_catalog::HttpCatalogSource::new(url.clone()))
        }
        #[cfg(not(feature = "http"))]
        CatalogLocation::Http(url) => {
            anyhow::bail!("catalog URL {url} configured but the `http` feature is disabled")
        }
        CatalogLocation::None => Box::new(StaticCatalog::default()),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_cart::InMemoryStorage;
    use storefront_catalog::CatalogError;
    use storefront_core::{Price, Product, ProductId};

    fn products() -> Vec<Product> {
        vec![
            Product::new(ProductId::new(1), "Shirt", "cotton", Price::new(100.0).unwrap()),
            Product::new(ProductId::new(2), "Pants", "denim", Price::new(50.0).unwrap()),
        ]
    }

    struct BrokenCatalog;

    #[async_trait::async_trait]
    impl CatalogSource for BrokenCatalog {
        async fn fetch_all(&self) -> Result<CatalogSnapshot, CatalogError> {
            Err(CatalogError::Network("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn assemble_hydrates_cart_and_loads_catalog() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryStorage::new());
        let source = StaticCatalog::new(products());

        let first = AppState::assemble(storage.clone(), &source, CartStoreConfig::default())
            .await
            .unwrap();
        let shirt = first.catalog.get(ProductId::new(1)).unwrap().clone();
        first.cart.add_to_cart(&shirt);
        first.cart.add_to_cart(&shirt);
        first.shutdown().await;

        let second = AppState::assemble(storage, &source, CartStoreConfig::default())
            .await
            .unwrap();
        assert_eq!(second.catalog.len(), 2);
        assert_eq!(second.cart.total_cart_items(), 2);
        assert_eq!(second.cart.total_price(), 200.0);
    }

    #[tokio::test]
    async fn unreachable_catalog_yields_empty_snapshot() {
        let state = AppState::assemble(
            Arc::new(InMemoryStorage::new()),
            &BrokenCatalog,
            CartStoreConfig::default(),
        )
        .await
        .unwrap();

        assert!(state.catalog.is_empty());
        assert_eq!(state.cart.total_cart_items(), 0);
    }
}
