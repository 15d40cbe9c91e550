//! `storefront-cart`
//!
//! **Responsibility:** the device-local shopping cart.
//!
//! This crate provides:
//! - The `Cart` aggregate (one line per product, insertion ordered)
//! - `CartStore`, the session's single source of truth for the cart
//! - Best-effort durable persistence through a `KeyValueStorage` slot
//!
//! Mutations are applied in memory first; the durable copy is written by a
//! background worker and failures there only show up in logs.

pub mod cart;
pub mod line;
pub mod persistence;
pub mod sqlite;
pub mod storage;
pub mod store;

pub use cart::{Cart, CorruptCart, DEFAULT_CART_KEY};
pub use line::CartLine;
pub use sqlite::SqliteStorage;
pub use storage::{InMemoryStorage, KeyValueStorage, StorageError};
pub use store::{CartStore, CartStoreConfig, CartStoreError, HydrationOutcome, StoreState};
