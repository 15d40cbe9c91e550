//! `storefront-core` - domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the cart and the
//! catalog (no infrastructure concerns, no IO).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod price;
pub mod product;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use price::Price;
pub use product::Product;
pub use value_object::ValueObject;
