//! Catalog query engine.
//!
//! Stateless search, price filtering and price sorting over an immutable
//! product snapshot. Every function reads its input and returns a new
//! sequence, so any number of callers can query the same snapshot
//! concurrently without coordination.
//!
//! Fetching the catalog is delegated to a [`CatalogSource`].

pub mod query;
pub mod snapshot;
pub mod source;

#[cfg(feature = "http")]
pub mod http;

pub use query::{
    filter_by_price, search, sort_by_price, QueryParameters, SortOrder, DEFAULT_MAX_PRICE,
};
pub use snapshot::CatalogSnapshot;
pub use source::{CatalogError, CatalogSource, JsonFileCatalog, StaticCatalog};

#[cfg(feature = "http")]
pub use http::HttpCatalogSource;
