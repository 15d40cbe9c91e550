//! Cart line: a product captured at add time plus a quantity.

use serde::{Deserialize, Serialize};
use storefront_core::{Price, Product, ProductId};

/// One distinct product in the cart.
///
/// The whole product is stored, so the cart stays renderable (and its total
/// stable) even if the catalog later changes or is unavailable. Serialised
/// flat: `{"id", "title", "description", "price", "quantity"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub(crate) fn first(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Price frozen when the product was first added.
    pub fn unit_price(&self) -> Price {
        self.product.price
    }

    /// `unit_price × quantity`.
    pub fn amount(&self) -> f64 {
        self.product.price.times(self.quantity)
    }
}
