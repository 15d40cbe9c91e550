//! Immutable catalog snapshot handed from the catalog source to callers.

use std::sync::Arc;

use storefront_core::{Product, ProductId};

use crate::query::{self, QueryParameters};

/// Shared, read-only product list.
///
/// Cloning is cheap (reference counted), so every screen can hold its own
/// handle to the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: Arc<[Product]>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into(),
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Product detail lookup.
    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Filtered and sorted catalog view for `params`.
    pub fn view(&self, params: &QueryParameters) -> Vec<Product> {
        params.apply(&self.products)
    }

    pub fn search(&self, term: &str) -> Vec<Product> {
        query::search(&self.products, term)
    }
}

impl From<Vec<Product>> for CatalogSnapshot {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortOrder;
    use storefront_core::Price;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            Product::new(ProductId::new(1), "Shirt", "cotton", Price::new(30.0).unwrap()),
            Product::new(ProductId::new(2), "Pants", "denim", Price::new(10.0).unwrap()),
            Product::new(ProductId::new(3), "Mesh cap", "summer", Price::new(20.0).unwrap()),
        ])
    }

    #[test]
    fn get_finds_products_by_id() {
        let catalog = snapshot();
        assert_eq!(catalog.get(ProductId::new(2)).map(|p| p.title.as_str()), Some("Pants"));
        assert!(catalog.get(ProductId::new(99)).is_none());
    }

    #[test]
    fn view_leaves_the_snapshot_untouched() {
        let catalog = snapshot();
        let params = QueryParameters::default().with_sort_order(SortOrder::Ascending);

        let view = catalog.view(&params);
        let view_ids: Vec<u64> = view.iter().map(|p| p.id.get()).collect();
        let source_ids: Vec<u64> = catalog.products().iter().map(|p| p.id.get()).collect();

        assert_eq!(view_ids, vec![2, 3, 1]);
        assert_eq!(source_ids, vec![1, 2, 3]);
    }

    #[test]
    fn clones_share_the_same_products() {
        let catalog = snapshot();
        let other = catalog.clone();
        assert!(std::ptr::eq(catalog.products(), other.products()));
        assert_eq!(other.search("sh").len(), 2);
    }

    #[test]
    fn snapshot_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CatalogSnapshot>();
    }
}
