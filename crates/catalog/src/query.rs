//! Filter, sort and search over a product slice.
//!
//! None of these functions mutate their input. Callers keep the canonical
//! list and re-derive a view whenever the parameters change.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use storefront_core::{DomainError, Product};

/// Upper bound of the price filter when the user has not narrowed it.
pub const DEFAULT_MAX_PRICE: f64 = 10_000.0;

/// Requested price ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Cheapest first; the home screen's initial ordering.
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
    None,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
            SortOrder::None => "none",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            "none" | "" => Ok(SortOrder::None),
            other => Err(DomainError::validation(format!(
                "unknown sort order '{other}' (expected asc, desc or none)"
            ))),
        }
    }
}

/// Caller-owned query state for the catalog view.
///
/// `min_price <= max_price` is the caller's job; an inverted range simply
/// produces an empty view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub min_price: f64,
    pub max_price: f64,
    pub sort_order: SortOrder,
    pub search_term: String,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            min_price: 0.0,
            max_price: DEFAULT_MAX_PRICE,
            sort_order: SortOrder::Ascending,
            search_term: String::new(),
        }
    }
}

impl QueryParameters {
    pub fn with_price_range(mut self, min_price: f64, max_price: f64) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Catalog view: filter by price first, then sort what is left.
    ///
    /// The search term is not applied here; search results are a separate
    /// overlay (see [`QueryParameters::search_results`]).
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let filtered = filter_by_price(products, self.min_price, self.max_price);
        sort_by_price(&filtered, self.sort_order)
    }

    pub fn search_results(&self, products: &[Product]) -> Vec<Product> {
        search(products, &self.search_term)
    }
}

/// Products whose price lies in `[min_price, max_price]`, in original order.
pub fn filter_by_price(products: &[Product], min_price: f64, max_price: f64) -> Vec<Product> {
    if min_price > max_price {
        return Vec::new();
    }

    products
        .iter()
        .filter(|p| p.price.within(min_price, max_price))
        .cloned()
        .collect()
}

/// A price-ordered copy of `products`.
///
/// Stable in both directions: equal prices keep their relative order.
/// `SortOrder::None` returns the input order unchanged.
pub fn sort_by_price(products: &[Product], order: SortOrder) -> Vec<Product> {
    let mut sorted = products.to_vec();
    match order {
        SortOrder::Ascending => sorted.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::Descending => sorted.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::None => {}
    }
    sorted
}

/// Case-insensitive substring match on the title.
///
/// An empty term yields no results rather than the whole catalog; the UI only
/// shows a results panel while a query is active.
pub fn search(products: &[Product], term: &str) -> Vec<Product> {
    if term.is_empty() {
        return Vec::new();
    }

    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
