//! Cart aggregate.

use std::collections::HashSet;

use storefront_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, Product, ProductId,
};

use crate::line::CartLine;

/// Storage key the cart snapshot lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "user_cart";

/// A persisted payload that exists but cannot be turned back into a cart.
#[derive(Debug, thiserror::Error)]
pub enum CorruptCart {
    #[error("cart payload is not valid JSON for a list of cart lines: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("cart payload breaks cart invariants: {0}")]
    Invalid(#[from] DomainError),
}

/// Aggregate root: the device-local cart.
///
/// Invariants:
/// - at most one line per product id
/// - every line has `quantity >= 1`
/// - lines are ordered by first add
///
/// `version` counts accepted mutations. Restoring a persisted copy is not a
/// mutation and leaves it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    key: String,
    lines: Vec<CartLine>,
    version: u64,
}

impl Cart {
    /// Create an empty cart bound to a storage key.
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            lines: Vec::new(),
            version: 0,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id() == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Add one unit of `product`; returns the line's new quantity.
    ///
    /// A product already in the cart keeps the price it was first added at.
    pub fn add(&mut self, product: &Product) -> u32 {
        let quantity = match self.lines.iter_mut().find(|l| l.product_id() == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                line.quantity
            }
            None => {
                self.lines.push(CartLine::first(product.clone()));
                1
            }
        };

        self.version += 1;
        quantity
    }

    /// Remove the line for `product_id`. Returns `false` (and does nothing)
    /// when the product is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id() != product_id);

        let removed = self.lines.len() != before;
        if removed {
            self.version += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.version += 1;
    }

    /// Sum of `price × quantity` over all lines. Recomputed on every call.
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::amount).sum()
    }

    /// Sum of quantities (badge count). Recomputed on every call.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Replace the lines with a persisted copy, provided nothing mutated the
    /// cart since `expected` was observed.
    pub fn restore(&mut self, lines: Vec<CartLine>, expected: ExpectedVersion) -> DomainResult<()> {
        expected.check(self.version)?;
        validate_lines(&lines)?;
        self.lines = lines;
        Ok(())
    }

    /// Serialise the lines for the durable slot.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }
}

/// The cart is identified by the storage key it persists under.
impl AggregateRoot for Cart {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Parse and validate a persisted cart payload.
pub fn decode_lines(raw: &str) -> Result<Vec<CartLine>, CorruptCart> {
    let lines: Vec<CartLine> = serde_json::from_str(raw)?;
    validate_lines(&lines)?;
    Ok(lines)
}

fn validate_lines(lines: &[CartLine]) -> DomainResult<()> {
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(DomainError::invariant(format!(
                "cart line for product {} has quantity 0",
                line.product_id()
            )));
        }
        if !seen.insert(line.product_id()) {
            return Err(DomainError::invariant(format!(
                "duplicate cart line for product {}",
                line.product_id()
            )));
        }
    }
    Ok(())
}
