//! Catalog product record.

use serde::{Deserialize, Serialize};

use crate::id::ProductId;
use crate::price::Price;

/// A product as supplied by the catalog source.
///
/// Read-only to the core and immutable for the lifetime of a session. Unknown
/// fields from a catalog backend (images, ratings, categories) are ignored on
/// decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
}

impl Product {
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        description: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_catalog_payload_ignoring_extra_fields() {
        let json = r#"{
            "id": 1,
            "title": "Backpack",
            "description": "Fits 15 inch laptops",
            "price": 109.95,
            "category": "bags",
            "image": "https://example.invalid/1.png"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.title, "Backpack");
        assert_eq!(product.price.value(), 109.95);
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let product: Product =
            serde_json::from_str(r#"{"id": 2, "title": "Mug", "price": 4}"#).unwrap();
        assert!(product.description.is_empty());
    }

    #[test]
    fn negative_price_fails_to_decode() {
        let result =
            serde_json::from_str::<Product>(r#"{"id": 3, "title": "Bad", "price": -1}"#);
        assert!(result.is_err());
    }
}
