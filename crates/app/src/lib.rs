//! `storefront-app`
//!
//! Composition root for the storefront client: reads configuration, opens
//! device storage, hydrates the cart once and loads the catalog snapshot
//! before any caller gets to touch them.

pub mod config;
pub mod state;

pub use config::{AppConfig, CatalogLocation, LoadedConfig};
pub use state::AppState;
